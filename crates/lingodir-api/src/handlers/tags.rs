//! Tag search handler.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::language::WantedLanguage;
use crate::AppState;
use lingodir_core::CompanySummary;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TagSearchQuery {
    /// Case-sensitive substring of a tag name in any language
    pub query: String,
}

/// Companies carrying a tag whose name contains the query.
///
/// Each company appears once, in the order its first matching tag was found.
#[utoipa::path(get, path = "/tags", tag = "Tags",
    params(
        TagSearchQuery,
        ("x-wanted-language" = Option<String>, Header, description = "Response language (default ko)")
    ),
    responses(
        (status = 200, description = "Matching companies", body = Vec<CompanySummary>)
    ))]
pub async fn search_by_tag(
    State(state): State<AppState>,
    WantedLanguage(lang): WantedLanguage,
    Query(query): Query<TagSearchQuery>,
) -> Result<Json<Vec<CompanySummary>>, ApiError> {
    let results = state.service.search_by_tag(&query.query, lang).await?;
    Ok(Json(results))
}
