//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST`   | `/api/entries` | Create an entry (201) |
//! | `GET`    | `/api/entries` | List entries, newest first |
//! | `GET`    | `/api/entries/{id}` | Fetch one entry |
//! | `PUT`    | `/api/entries/{id}` | Full replace |
//! | `DELETE` | `/api/entries/{id}` | Delete |
//! | `PATCH`  | `/api/entries/{id}/status` | Status-only update (query params) |
//! | `GET`    | `/api/stats` | Statistics report |
//! | `GET`    | `/api/suggestions/companies` | Company autocomplete |
//! | `GET`    | `/api/suggestions/contacts` | Contact-person autocomplete |
//! | `GET`    | `/api/check-duplicate` | Contact/company conflict check |
//! | `GET`    | `/api/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "success": false, "code": "bad_request", "error": "validation failed: ...",
//!   "details": [{ "field": "club", "message": "..." }] }
//! ```
//!
//! Codes: `bad_request` (400, with `details`), `blocked` (400, with
//! `blocked_keywords`), `not_found` (404), `internal` (500).
//!
//! Suggestion and duplicate-check endpoints never fail with 5xx: store
//! errors come back as `success: false` with status 200.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use tracker_core::duplicate::{check_duplicates, DuplicateCheckRequest};
use tracker_core::entries::{self, EntryError};
use tracker_core::filter::{EntryFilter, EntryQuery};
use tracker_core::models::now_iso;
use tracker_core::screener::KeywordScreener;
use tracker_core::stats::build_report;
use tracker_core::store::{EntryStore, SuggestField};
use tracker_core::suggest::{normalize_query, MIN_QUERY_CHARS, SUGGESTION_LIMIT};
use tracker_core::validate::{EntryInput, FieldError};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn EntryStore>,
    screener: Arc<KeywordScreener>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>, screener: KeywordScreener) -> Self {
        Self {
            store,
            screener: Arc::new(screener),
        }
    }
}

/// Build the screener for a deployment: built-in lists plus configured extras.
pub fn screener_from_config(config: &Config) -> KeywordScreener {
    KeywordScreener::new().with_extra(
        &config.screener.extra_company_keywords,
        &config.screener.extra_opportunity_keywords,
    )
}

/// Assemble every route over `state`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/entries", get(handle_list_entries).post(handle_create_entry))
        .route(
            "/api/entries/{id}",
            get(handle_get_entry)
                .put(handle_replace_entry)
                .delete(handle_delete_entry),
        )
        .route("/api/entries/{id}/status", patch(handle_update_status))
        .route("/api/stats", get(handle_stats))
        .route("/api/suggestions/companies", get(handle_suggest_companies))
        .route("/api/suggestions/contacts", get(handle_suggest_contacts))
        .route("/api/check-duplicate", get(handle_check_duplicate))
        .route("/api/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind`.
///
/// Opens the database, applies migrations, and serves until Ctrl-C. The
/// pool is closed after in-flight requests drain.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;

    let store = Arc::new(SqliteStore::new(pool.clone()));
    let state = AppState::new(store, screener_from_config(config));
    let app = build_router(state);

    let bind_addr = &config.server.bind;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    println!("Outreach tracker listening on http://{}", bind_addr);
    log::info!("database: {}", config.db.path.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("received Ctrl-C, shutting down"),
        Err(e) => log::error!("failed to listen for Ctrl-C: {}", e),
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked_keywords: Option<Vec<String>>,
}

/// Handler error that converts into an Axum HTTP response.
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Vec<FieldError>>,
    blocked_keywords: Option<Vec<String>>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            blocked_keywords: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code,
            error: self.message,
            details: self.details,
            blocked_keywords: self.blocked_keywords,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn internal(err: anyhow::Error) -> ApiError {
    log::error!("internal error: {:#}", err);
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        format!("Internal server error: {}", err),
    )
}

impl From<EntryError> for ApiError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::Invalid(invalid) => {
                log::warn!("rejected entry: {}", invalid);
                let mut e = bad_request(invalid.to_string());
                e.details = Some(invalid.0);
                e
            }
            EntryError::Blocked { field, keywords } => {
                log::warn!(
                    "blocked {:?} with keywords [{}]",
                    field,
                    keywords.join(", ")
                );
                let mut e = ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "blocked",
                    field.rejection_message(),
                );
                e.blocked_keywords = Some(keywords);
                e
            }
            EntryError::NotFound(id) => {
                log::warn!("entry not found: {}", id);
                ApiError::new(StatusCode::NOT_FOUND, "not_found", "Entry not found")
            }
            EntryError::Store(err) => internal(err),
        }
    }
}

fn json_body(payload: Result<Json<EntryInput>, JsonRejection>) -> Result<EntryInput, ApiError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

// ============ /api/entries ============

async fn handle_create_entry(
    State(state): State<AppState>,
    payload: Result<Json<EntryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = json_body(payload)?;
    let entry = entries::create_entry(state.store.as_ref(), &state.screener, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Entry created successfully",
            "data": entry,
        })),
    ))
}

/// Query parameters for `GET /api/entries`.
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    member_name: Option<String>,
    club: Option<String>,
    status: Option<String>,
    company: Option<String>,
    opportunity_type: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

async fn handle_list_entries(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = query_params(params)?;
    let query = EntryQuery::new(
        EntryFilter::new(
            params.club,
            params.member_name,
            params.start_date,
            params.end_date,
        ),
        params.status,
        params.company,
        params.opportunity_type,
    );
    let found = state.store.list_entries(&query).await.map_err(internal)?;
    Ok(Json(json!({
        "success": true,
        "count": found.len(),
        "data": found,
    })))
}

async fn handle_get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let entry = entries::get_entry(state.store.as_ref(), &id).await?;
    Ok(Json(json!({ "success": true, "data": entry })))
}

async fn handle_replace_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EntryInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = json_body(payload)?;
    let entry =
        entries::replace_entry(state.store.as_ref(), &state.screener, &id, &input).await?;
    log::info!("updated entry {}", entry.id);
    Ok(Json(json!({
        "success": true,
        "message": "Entry updated successfully",
        "data": entry,
    })))
}

async fn handle_delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    entries::delete_entry(state.store.as_ref(), &id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Entry deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
struct StatusParams {
    status: Option<String>,
    status_notes: Option<String>,
}

async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<StatusParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = query_params(params)?;
    let status = params
        .status
        .ok_or_else(|| bad_request("status query parameter is required"))?;
    let entry = entries::update_status(
        state.store.as_ref(),
        &id,
        &status,
        params.status_notes.as_deref(),
    )
    .await?;
    log::info!("entry {} status set to {}", entry.id, entry.status);
    Ok(Json(json!({
        "success": true,
        "message": "Status updated successfully",
        "data": entry,
    })))
}

// ============ GET /api/stats ============

async fn handle_stats(
    State(state): State<AppState>,
    filter: Result<Query<EntryFilter>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let filter = query_params(filter)?.normalized();
    let today = chrono::Local::now().date_naive();
    let report = build_report(state.store.as_ref(), &filter, today)
        .await
        .map_err(internal)?;
    Ok(Json(json!({ "success": true, "data": report })))
}

// ============ GET /api/suggestions/* ============

#[derive(Debug, Deserialize)]
struct SuggestParams {
    q: Option<String>,
}

async fn handle_suggest_companies(
    State(state): State<AppState>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    suggest(&state, SuggestField::Company, query_params(params)?).await
}

async fn handle_suggest_contacts(
    State(state): State<AppState>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    suggest(&state, SuggestField::ContactPerson, query_params(params)?).await
}

async fn suggest(
    state: &AppState,
    field: SuggestField,
    params: SuggestParams,
) -> Result<Json<Value>, ApiError> {
    let raw = params.q.unwrap_or_default();
    let q = normalize_query(&raw).ok_or_else(|| {
        bad_request(format!(
            "q must be at least {} characters long",
            MIN_QUERY_CHARS
        ))
    })?;

    match state.store.suggest_values(field, q, SUGGESTION_LIMIT).await {
        Ok(values) => Ok(Json(json!({ "success": true, "data": values }))),
        Err(e) => {
            log::error!("{} suggestions failed: {:#}", field.column(), e);
            Ok(Json(json!({ "success": false, "data": [] })))
        }
    }
}

// ============ GET /api/check-duplicate ============

async fn handle_check_duplicate(
    State(state): State<AppState>,
    req: Result<Query<DuplicateCheckRequest>, QueryRejection>,
) -> Json<Value> {
    let req = match req {
        Ok(Query(req)) => req,
        Err(rejection) => {
            log::warn!("rejected duplicate check: {}", rejection.body_text());
            return Json(json!({ "success": false, "error": rejection.body_text() }));
        }
    };
    match check_duplicates(state.store.as_ref(), &state.screener, &req).await {
        Ok(report) => Json(json!({ "success": true, "data": report })),
        Err(e) => {
            log::error!("duplicate check failed: {:#}", e);
            Json(json!({ "success": false, "error": e.to_string() }))
        }
    }
}

// ============ GET /api/health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: now_iso(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
