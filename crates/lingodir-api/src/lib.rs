//! # lingodir-api
//!
//! HTTP surface of the multilingual company directory. The binary in
//! `main.rs` reads configuration, connects to PostgreSQL and serves
//! [`router`]; tests drive the same router over an in-memory store.

pub mod config;
pub mod error;
pub mod handlers;
pub mod language;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

use lingodir_core::DirectoryService;
use lingodir_db::Database;

pub use config::{RateLimitConfig, ServerConfig};
pub use error::{ApiError, ErrorBody};
pub use language::{WantedLanguage, WANTED_LANGUAGE_HEADER};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no per-client buckets).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: DirectoryService,
    /// Database behind the service, if any; used by the health check.
    pub db: Option<Database>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(service: DirectoryService) -> Self {
        Self {
            service,
            db: None,
            rate_limiter: None,
        }
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_rate_limit(mut self, config: &RateLimitConfig) -> Self {
        self.rate_limiter = build_rate_limiter(config);
        self
    }
}

/// Build the global limiter, or `None` when disabled or misconfigured.
pub fn build_rate_limiter(config: &RateLimitConfig) -> Option<Arc<GlobalRateLimiter>> {
    if !config.enabled {
        return None;
    }
    let burst = NonZeroU32::new(config.requests);
    let quota = Quota::with_period(Duration::from_secs(config.period_secs));
    match (quota, burst) {
        (Some(quota), Some(burst)) => Some(Arc::new(RateLimiter::direct(quota.allow_burst(burst)))),
        _ => {
            tracing::warn!(
                requests = config.requests,
                period_secs = config.period_secs,
                "Rate limit needs a non-zero request count and period, disabling"
            );
            None
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "lingodir API",
        description = "Multilingual directory of companies and their tags"
    ),
    paths(
        handlers::companies::autocomplete,
        handlers::companies::get_company,
        handlers::companies::create_company,
        handlers::companies::add_tags,
        handlers::companies::delete_tag,
        handlers::tags::search_by_tag,
        handlers::system::health_check,
    ),
    components(schemas(
        lingodir_core::Language,
        lingodir_core::LocalizedNames,
        lingodir_core::TagInput,
        lingodir_core::CreateCompanyRequest,
        lingodir_core::CompanyView,
        lingodir_core::CompanySummary,
        ErrorBody,
    )),
    tags(
        (name = "Companies", description = "Company lookup, registration and tagging"),
        (name = "Tags", description = "Tag search"),
        (name = "System", description = "Health checks and API description")
    )
)]
pub struct ApiDoc;

async fn rate_limit_middleware(
    axum::extract::State(state): axum::extract::State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = "api", "Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorBody {
                    error: "Too many requests. Please wait before retrying.".to_string(),
                }),
            ));
        }
    }
    Ok(next.run(request).await)
}

/// Build the application router with its middleware stack.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    use handlers::{companies, system, tags};

    Router::new()
        .route("/search", get(companies::autocomplete))
        .route("/companies", post(companies::create_company))
        .route("/companies/:company_name", get(companies::get_company))
        .route("/companies/:company_name/tags", put(companies::add_tags))
        .route(
            "/companies/:company_name/tags/:tag_name",
            axum::routing::delete(companies::delete_tag),
        )
        .route("/tags", get(tags::search_by_tag))
        .route("/health", get(system::health_check))
        .route("/openapi.json", get(system::openapi_json))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(WANTED_LANGUAGE_HEADER),
                ])
                .max_age(Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .with_state(state)
}
