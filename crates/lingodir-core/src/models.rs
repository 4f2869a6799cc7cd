//! Domain types shared by every lingodir crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Maximum length of a company or tag name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a stored language code.
pub const MAX_LANGUAGE_CODE_LEN: usize = 8;

/// Surrogate key of a company.
pub type CompanyId = i64;

/// Surrogate key of a tag.
pub type TagId = i64;

// =============================================================================
// LANGUAGE
// =============================================================================

/// The closed set of languages a name can be registered in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Korean
    Ko,
    /// English
    En,
    /// Japanese
    Ja,
    /// Traditional Chinese (Taiwan)
    Tw,
}

impl Language {
    /// Declared lookup order for get-or-create, and insertion order for
    /// name rows. Korean is the primary language.
    pub const PRIORITY: [Language; 4] = [Language::Ko, Language::En, Language::Ja, Language::Tw];

    /// Language used when a request names none, or one we do not know.
    pub const DEFAULT: Language = Language::Ko;

    /// Wire and storage code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
            Language::Ja => "ja",
            Language::Tw => "tw",
        }
    }

    /// Parse an exact, lower-case language code.
    pub fn parse(code: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|lang| lang.code() == code)
    }

    /// Resolve the requested language from an optional header value,
    /// falling back to [`Language::DEFAULT`].
    pub fn from_header(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(Self::DEFAULT)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidInput(format!("Unknown language code '{}'", s)))
    }
}

// =============================================================================
// LOCALIZED NAME PAYLOADS
// =============================================================================

/// One optional name per supported language.
///
/// Empty strings count as absent, so `{"ko": ""}` carries no names at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LocalizedNames {
    #[serde(default)]
    pub ko: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
    #[serde(default)]
    pub ja: Option<String>,
    #[serde(default)]
    pub tw: Option<String>,
}

impl LocalizedNames {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, lang: Language, name: impl Into<String>) -> Self {
        self.set(lang, name);
        self
    }

    /// Set the name for one language, replacing any previous value.
    pub fn set(&mut self, lang: Language, name: impl Into<String>) {
        *self.slot_mut(lang) = Some(name.into());
    }

    /// The non-empty name for `lang`, if any.
    pub fn get(&self, lang: Language) -> Option<&str> {
        let slot = match lang {
            Language::Ko => &self.ko,
            Language::En => &self.en,
            Language::Ja => &self.ja,
            Language::Tw => &self.tw,
        };
        slot.as_deref().filter(|name| !name.is_empty())
    }

    /// Non-empty names in [`Language::PRIORITY`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> + '_ {
        Language::PRIORITY
            .into_iter()
            .filter_map(move |lang| self.get(lang).map(|name| (lang, name)))
    }

    /// True when no language carries a non-empty name.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Reject payloads with no names or with over-long names.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidInput(
                "At least one localized name is required".to_string(),
            ));
        }
        for (lang, name) in self.iter() {
            if name.chars().count() > MAX_NAME_LEN {
                return Err(Error::InvalidInput(format!(
                    "Name for '{}' must be {} characters or less",
                    lang, MAX_NAME_LEN
                )));
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, lang: Language) -> &mut Option<String> {
        match lang {
            Language::Ko => &mut self.ko,
            Language::En => &mut self.en,
            Language::Ja => &mut self.ja,
            Language::Tw => &mut self.tw,
        }
    }
}

/// A stored name row for a company or a tag.
///
/// `id` grows with insertion, so sorting by `id` gives insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub id: i64,
    pub language: Language,
    pub name: String,
}

impl NameRecord {
    pub fn new(id: i64, language: Language, name: impl Into<String>) -> Self {
        Self {
            id,
            language,
            name: name.into(),
        }
    }
}

// =============================================================================
// REQUESTS AND VIEWS
// =============================================================================

/// A tag to attach, given by its localized names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TagInput {
    pub tag_name: LocalizedNames,
}

impl TagInput {
    pub fn new(tag_name: LocalizedNames) -> Self {
        Self { tag_name }
    }
}

/// Request for registering a new company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub company_name: LocalizedNames,
    #[serde(default)]
    pub tags: Vec<TagInput>,
}

/// The full localized state of a company, returned by every read and
/// mutation on a single company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanyView {
    pub company_name: String,
    /// Localized tag names, sorted and free of duplicates.
    pub tags: Vec<String>,
}

/// A single localized company name (autocomplete and tag-search rows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanySummary {
    pub company_name: String,
}

/// Outcome of importing one bulk-loader row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub company_id: CompanyId,
    /// Whether the company was new to the directory.
    pub company_created: bool,
    /// Number of company-tag links that did not exist before.
    pub links_created: usize,
}
