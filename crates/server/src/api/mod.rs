use crate::config::AppState;
use a2t_core::{A2tError, ErrorCode, ErrorDetail};
use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Well-known capability negotiation path
pub const CAPABILITIES_PATH: &str = "/.well-known/a2t-capabilities.json";

/// Start the API server
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("a2t server listening on {}", addr);
    tracing::info!("Capabilities: http://{}{}", addr, CAPABILITIES_PATH);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router. Routes are derived from the provider's
/// capabilities; group routes exist only when the groups feature is on.
pub fn create_router(state: AppState) -> Router {
    let capabilities = state.provider.get_capabilities().clone();
    let tools_path = capabilities.endpoints.tools.clone();

    let mut router = Router::new()
        .route(CAPABILITIES_PATH, get(handlers::get_capabilities))
        .route(&tools_path, get(handlers::list_tools))
        .route(
            &format!("{}/{{name}}", tools_path),
            post(handlers::execute_tool),
        );

    if let Some(groups_path) = capabilities.groups_path() {
        router = router
            .route(groups_path, get(handlers::list_groups))
            .route(&format!("{}/{{id}}", groups_path), get(handlers::get_group))
            .route(
                &format!("{}/{{id}}/tools", groups_path),
                get(handlers::list_group_tools),
            )
            .route(
                &format!("{}/{{id}}/tools/{{name}}", groups_path),
                post(handlers::execute_group_tool),
            );
    }

    tracing::info!(
        "Mounted tools at {} (groups: {})",
        tools_path,
        capabilities.groups_path().unwrap_or("disabled")
    );

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Body carrying a protocol or request error
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error type for API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Error raised by the provider
    Provider(A2tError),
    /// Malformed request the provider never saw
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            // Catalog-level conditions are data: 200 with a structured body
            Self::Provider(err) if err.is_protocol_error() => (StatusCode::OK, err.to_detail()),
            Self::Provider(err) => (StatusCode::BAD_REQUEST, err.to_detail()),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(ErrorCode::InvalidRequest, message),
            ),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<A2tError> for ApiError {
    fn from(err: A2tError) -> Self {
        Self::Provider(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
