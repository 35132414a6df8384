use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{PredictionId, PredictionStatus};

/// Body the client posts to the proxy. Each image is a `data:` URL or an
/// `http(s)` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryOnRequest {
    pub model_image: String,
    pub cloth_image: String,
}

/// Input block for the IDM-VTON model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryOnInput {
    pub human_img: String,
    pub garm_img: String,
    pub garment_des: String,
    pub crop: bool,
    pub seed: i64,
}

/// Body the proxy posts to the provider's prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePredictionRequest {
    pub version: String,
    pub input: TryOnInput,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub get: Option<String>,
    #[serde(default)]
    pub cancel: Option<String>,
}

/// The provider reports output either as a single URL or as a list of URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Single(String),
    Many(Vec<String>),
}

impl PredictionOutput {
    pub fn first_url(&self) -> Option<&str> {
        match self {
            Self::Single(url) => Some(url.as_str()),
            Self::Many(urls) => urls.first().map(String::as_str),
        }
    }
}

/// Job descriptor as returned by the provider. Fields the client does not
/// read are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: PredictionId,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: PredictionUrls,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Prediction {
    pub fn output_url(&self) -> Option<&str> {
        self.output.as_ref().and_then(PredictionOutput::first_url)
    }

    /// Provider error rendered as text; strings are unquoted.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(Value::Null) => None,
            Some(Value::String(message)) => Some(message.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    pub fn run_time(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.created_at?)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
