//! Company HTTP handlers.
//!
//! Every response is localized into the language named by the
//! `x-wanted-language` header.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ApiError, ErrorBody};
use crate::language::WantedLanguage;
use crate::AppState;
use lingodir_core::{CompanySummary, CompanyView, CreateCompanyRequest, TagInput};

/// Query parameters for company-name autocomplete.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AutocompleteQuery {
    /// Case-insensitive substring of a company name
    pub query: String,
}

/// Company names in the requested language containing the query.
#[utoipa::path(get, path = "/search", tag = "Companies",
    params(
        AutocompleteQuery,
        ("x-wanted-language" = Option<String>, Header, description = "Response language (default ko)")
    ),
    responses(
        (status = 200, description = "Matching company names", body = Vec<CompanySummary>),
        (status = 400, description = "Empty query", body = ErrorBody)
    ))]
pub async fn autocomplete(
    State(state): State<AppState>,
    WantedLanguage(lang): WantedLanguage,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<Vec<CompanySummary>>, ApiError> {
    let results = state.service.autocomplete(&query.query, lang).await?;
    Ok(Json(results))
}

/// Look up a company by any of its names.
#[utoipa::path(get, path = "/companies/{company_name}", tag = "Companies",
    params(
        ("company_name" = String, Path, description = "Company name in any language"),
        ("x-wanted-language" = Option<String>, Header, description = "Response language (default ko)")
    ),
    responses(
        (status = 200, description = "Localized company", body = CompanyView),
        (status = 404, description = "Unknown company", body = ErrorBody)
    ))]
pub async fn get_company(
    State(state): State<AppState>,
    WantedLanguage(lang): WantedLanguage,
    Path(company_name): Path<String>,
) -> Result<Json<CompanyView>, ApiError> {
    let view = state.service.get(&company_name, lang).await?;
    Ok(Json(view))
}

/// Register a new company with its tags.
///
/// Tags are matched against existing ones by name; unknown tags are created.
#[utoipa::path(post, path = "/companies", tag = "Companies",
    request_body = CreateCompanyRequest,
    params(
        ("x-wanted-language" = Option<String>, Header, description = "Response language (default ko)")
    ),
    responses(
        (status = 201, description = "Company created", body = CompanyView),
        (status = 400, description = "Empty or oversized names", body = ErrorBody),
        (status = 409, description = "A company already uses one of the names", body = ErrorBody)
    ))]
pub async fn create_company(
    State(state): State<AppState>,
    WantedLanguage(lang): WantedLanguage,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyView>), ApiError> {
    let view = state.service.create(&req, lang).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Attach tags to a company, creating unknown tags.
#[utoipa::path(put, path = "/companies/{company_name}/tags", tag = "Companies",
    request_body = Vec<TagInput>,
    params(
        ("company_name" = String, Path, description = "Company name in any language"),
        ("x-wanted-language" = Option<String>, Header, description = "Response language (default ko)")
    ),
    responses(
        (status = 200, description = "Updated company", body = CompanyView),
        (status = 404, description = "Unknown company", body = ErrorBody)
    ))]
pub async fn add_tags(
    State(state): State<AppState>,
    WantedLanguage(lang): WantedLanguage,
    Path(company_name): Path<String>,
    Json(tags): Json<Vec<TagInput>>,
) -> Result<Json<CompanyView>, ApiError> {
    let view = state.service.add_tags(&company_name, &tags, lang).await?;
    Ok(Json(view))
}

/// Detach a tag from a company.
#[utoipa::path(delete, path = "/companies/{company_name}/tags/{tag_name}", tag = "Companies",
    params(
        ("company_name" = String, Path, description = "Company name in any language"),
        ("tag_name" = String, Path, description = "Tag name in any language"),
        ("x-wanted-language" = Option<String>, Header, description = "Response language (default ko)")
    ),
    responses(
        (status = 200, description = "Updated company", body = CompanyView),
        (status = 404, description = "Unknown company or tag", body = ErrorBody)
    ))]
pub async fn delete_tag(
    State(state): State<AppState>,
    WantedLanguage(lang): WantedLanguage,
    Path((company_name, tag_name)): Path<(String, String)>,
) -> Result<Json<CompanyView>, ApiError> {
    let view = state
        .service
        .delete_tag(&company_name, &tag_name, lang)
        .await?;
    Ok(Json(view))
}
