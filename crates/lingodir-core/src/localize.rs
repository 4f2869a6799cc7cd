//! Localized name selection.
//!
//! A company or tag may carry one name per language. When a caller asks for
//! a language the entity has no name in, the first name ever stored for it
//! is shown instead. There is deliberately no language-priority chain here:
//! the fallback is "whatever was registered first".

use std::collections::BTreeSet;

use crate::models::{Language, NameRecord};

/// Pick the name to display for `preferred`.
///
/// `names` must be in insertion order. Returns `None` only when `names` is
/// empty.
pub fn resolve(names: &[NameRecord], preferred: Language) -> Option<&str> {
    names
        .iter()
        .find(|record| record.language == preferred)
        .or_else(|| names.first())
        .map(|record| record.name.as_str())
}

/// Sort and de-duplicate localized strings.
///
/// De-duplication is on the string value, so two different tags that share
/// a display name in the requested language collapse into one entry.
pub fn sorted_unique<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}
