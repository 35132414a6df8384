use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MethodNotAllowed,
    Validation,
    Configuration,
    Upstream,
    Unavailable,
    Internal,
}

/// JSON error body returned by the proxy: `{ "error": "...", "code": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(default = "default_code")]
    pub code: ErrorCode,
}

fn default_code() -> ErrorCode {
    ErrorCode::Internal
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code,
        }
    }
}
