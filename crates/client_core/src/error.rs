use std::time::Duration;

use shared::domain::{PredictionId, PredictionStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to submit try-on job (status {status}){}", detail(.message))]
    Submit { status: u16, message: Option<String> },

    #[error("failed to fetch job {id} (status {status}){}", detail(.message))]
    Status {
        id: PredictionId,
        status: u16,
        message: Option<String>,
    },

    #[error("malformed job descriptor: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("job {id} {status}: {message}")]
    JobFailed {
        id: PredictionId,
        status: PredictionStatus,
        message: String,
    },

    #[error("job {id} succeeded without an output image")]
    MissingOutput { id: PredictionId },

    #[error("job {id} still {status} after {attempts} status checks ({elapsed:?})")]
    Timeout {
        id: PredictionId,
        status: PredictionStatus,
        attempts: u32,
        elapsed: Duration,
    },
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}
