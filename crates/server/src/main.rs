use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::Value;
use shared::error::{ApiError, ErrorCode};
use tower_http::{limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer};
use tracing::{info, warn};

mod api;
mod app_state;
mod config;
mod provider;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use api::{fetch_prediction, prediction_route, submit_try_on, try_on_route, ApiContext, ModelParams};
use app_state::AppState;
use config::load_settings;
use provider::{PredictionProvider, ReplicateProvider};

/// Two base64 photos comfortably fit; anything larger is refused before parsing.
const MAX_REQUEST_BYTES: usize = 20 * 1024 * 1024;

const CORS_ALLOW_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
const CORS_ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let provider: Option<Arc<dyn PredictionProvider>> = match &settings.replicate_api_token {
        Some(token) => Some(Arc::new(ReplicateProvider::new(
            &settings.replicate_api_url,
            token.clone(),
            settings.upstream_timeout(),
        )?)),
        None => {
            warn!("REPLICATE_API_TOKEN is not set; try-on requests will fail until it is configured");
            None
        }
    };
    let api = ApiContext {
        provider,
        model: ModelParams::from_settings(&settings),
    };

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, provider = %settings.replicate_api_url, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(try_on_route(), any(try_on))
        .route(
            prediction_route(),
            get(prediction_status).options(preflight),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn try_on(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::POST {
        return Err(reject(ApiError::new(
            ErrorCode::MethodNotAllowed,
            "Method not allowed",
        )));
    }

    let prediction = submit_try_on(&state.api, &body).await.map_err(reject)?;
    Ok(Json(prediction).into_response())
}

async fn prediction_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    let prediction = fetch_prediction(&state.api, &id).await.map_err(reject)?;
    Ok(Json(prediction))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Configuration
        | ErrorCode::Upstream
        | ErrorCode::Unavailable
        | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(error.code), Json(error))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
