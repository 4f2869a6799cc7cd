//! Response language negotiation.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use lingodir_core::Language;

/// Header carrying the client's preferred language.
pub const WANTED_LANGUAGE_HEADER: &str = "x-wanted-language";

/// Language requested through `x-wanted-language`.
///
/// Missing, unreadable or unknown values fall back to Korean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WantedLanguage(pub Language);

#[axum::async_trait]
impl<S> FromRequestParts<S> for WantedLanguage
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(WANTED_LANGUAGE_HEADER)
            .and_then(|v| v.to_str().ok());
        Ok(WantedLanguage(Language::from_header(value)))
    }
}
