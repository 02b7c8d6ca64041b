//! HTTP API for translation records and the contribution operations.

use crate::auth::is_authorized;
use crate::error::TranslationError;
use crate::record::{NewTranslation, TranslationUpdate};
use crate::translation::{ContributeArgs, Session, TranslationService};
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

pub const SESSION_USER_HEADER: &str = "x-session-user";
pub const SESSION_FULLNAME_HEADER: &str = "x-session-fullname";

#[derive(Clone)]
pub struct AppState {
    pub service: TranslationService,
    pub api_key: String,
}

/// Successful response: `{"message": ..., "notices": [...]}`
#[derive(Debug, Serialize)]
struct Envelope<T> {
    message: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notices: Vec<String>,
}

fn envelope<T: Serialize>(message: T, notices: Vec<String>) -> Json<Envelope<T>> {
    Json(Envelope { message, notices })
}

pub struct ApiError(StatusCode, String);

impl From<TranslationError> for ApiError {
    fn from(e: TranslationError) -> Self {
        let status = match &e {
            TranslationError::NotFound(_) => StatusCode::NOT_FOUND,
            TranslationError::InvalidTranslationMap(_) => StatusCode::BAD_REQUEST,
            TranslationError::Remote { .. } | TranslationError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            TranslationError::Encode(_) | TranslationError::Store(_) => {
                error!("Request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user = header_str(SESSION_USER_HEADER).ok_or_else(|| {
            ApiError(
                StatusCode::BAD_REQUEST,
                format!("Missing {} header", SESSION_USER_HEADER),
            )
        })?;

        let mut session = Session::new(user);
        if let Some(full_name) = header_str(SESSION_FULLNAME_HEADER) {
            session = session.with_full_name(full_name);
        }
        Ok(session)
    }
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !is_authorized(request.headers(), &state.api_key) {
        warn!("Rejected unauthorized request to {}", request.uri().path());
        return ApiError(StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response();
    }
    next.run(request).await
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/method/contribute_translation",
            post(contribute_translation),
        )
        .route("/api/method/create_translations", post(create_translations))
        .route("/api/resource/Translation", post(insert_translation))
        .route(
            "/api/resource/Translation/:name",
            get(load_translation)
                .put(save_translation)
                .delete(delete_translation),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn insert_translation(
    State(state): State<AppState>,
    Json(new): Json<NewTranslation>,
) -> ApiResult<impl IntoResponse> {
    let record = state.service.insert(new).await?;
    Ok((StatusCode::CREATED, envelope(record, Vec::new())))
}

async fn load_translation(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let loaded = state.service.load(&name).await?;
    Ok(envelope(loaded.record, loaded.notice.into_iter().collect()))
}

async fn save_translation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(update): Json<TranslationUpdate>,
) -> ApiResult<impl IntoResponse> {
    let record = state.service.save(&name, update).await?;
    Ok(envelope(record, Vec::new()))
}

async fn delete_translation(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete(&name).await?;
    Ok(envelope("ok", Vec::new()))
}

async fn contribute_translation(
    State(state): State<AppState>,
    _session: Session,
    Json(args): Json<ContributeArgs>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.service.contribute_translation(args).await?;
    let notices = outcome.notice().map(str::to_string).into_iter().collect();
    Ok(envelope(outcome, notices))
}

#[derive(Debug, Deserialize)]
struct CreateTranslationsArgs {
    /// A JSON-encoded string, or the map itself
    translation_map: serde_json::Value,
    language: String,
}

async fn create_translations(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CreateTranslationsArgs>,
) -> ApiResult<impl IntoResponse> {
    let map = match args.translation_map {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };

    let report = state
        .service
        .create_translations(&map, &args.language, &session)
        .await?;
    let notices = report.notice().map(str::to_string).into_iter().collect();
    Ok(envelope(report, notices))
}
