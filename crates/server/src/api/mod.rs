use std::sync::Arc;

use serde_json::Value;
use shared::{
    domain::PredictionId,
    error::{ApiError, ErrorCode},
    protocol::{CreatePredictionRequest, TryOnInput, TryOnRequest},
};
use tracing::{error, info};

use crate::{
    config::Settings,
    provider::{PredictionProvider, ProviderError},
};

pub const MISSING_TOKEN_MESSAGE: &str = "provider API token is not configured";

/// Fixed model parameters sent with every submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub version: String,
    pub garment_description: String,
    pub crop: bool,
    pub seed: i64,
}

impl ModelParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            version: settings.model_version.clone(),
            garment_description: settings.garment_description.clone(),
            crop: settings.crop,
            seed: settings.seed,
        }
    }

    pub fn build_request(&self, req: TryOnRequest) -> CreatePredictionRequest {
        CreatePredictionRequest {
            version: self.version.clone(),
            input: TryOnInput {
                human_img: req.model_image,
                garm_img: req.cloth_image,
                garment_des: self.garment_description.clone(),
                crop: self.crop,
                seed: self.seed,
            },
        }
    }
}

/// `provider` is `None` when no API token was configured; every forward then
/// fails closed.
#[derive(Clone)]
pub struct ApiContext {
    pub provider: Option<Arc<dyn PredictionProvider>>,
    pub model: ModelParams,
}

pub fn try_on_route() -> &'static str {
    "/api/try-on"
}

pub fn prediction_route() -> &'static str {
    "/api/try-on/:id"
}

pub async fn submit_try_on(ctx: &ApiContext, body: &[u8]) -> Result<Value, ApiError> {
    let provider = require_provider(ctx)?;

    let req: TryOnRequest = serde_json::from_slice(body).map_err(|e| {
        ApiError::new(ErrorCode::Validation, format!("invalid request body: {e}"))
    })?;
    if req.model_image.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "model_image is required"));
    }
    if req.cloth_image.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "cloth_image is required"));
    }

    let request = ctx.model.build_request(req);
    let prediction = provider
        .create_prediction(&request)
        .await
        .map_err(upstream)?;
    let prediction_id = prediction
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default();
    info!(prediction_id, "submitted try-on prediction");
    Ok(prediction)
}

pub async fn fetch_prediction(ctx: &ApiContext, id: &str) -> Result<Value, ApiError> {
    let provider = require_provider(ctx)?;

    let id = id.trim();
    if !is_valid_prediction_id(id) {
        return Err(ApiError::new(ErrorCode::Validation, "invalid prediction id"));
    }

    provider
        .get_prediction(&PredictionId(id.to_string()))
        .await
        .map_err(upstream)
}

/// Provider ids are short alphanumeric tokens. Anything that could change the
/// upstream path or query (`/`, `?`, `%`, `..`) is refused.
fn is_valid_prediction_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn require_provider(ctx: &ApiContext) -> Result<&Arc<dyn PredictionProvider>, ApiError> {
    ctx.provider.as_ref().ok_or_else(|| {
        error!("rejecting request: REPLICATE_API_TOKEN is not set");
        ApiError::new(ErrorCode::Configuration, MISSING_TOKEN_MESSAGE)
    })
}

fn upstream(err: ProviderError) -> ApiError {
    error!(%err, "provider request failed");
    let code = match err {
        ProviderError::Transport(_) => ErrorCode::Unavailable,
        ProviderError::Rejected { .. } | ProviderError::Decode(_) => ErrorCode::Upstream,
    };
    ApiError::new(code, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
