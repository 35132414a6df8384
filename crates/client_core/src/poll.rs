//! Waiting for a provider job to finish.

use std::{future::Future, time::Instant};

use shared::{
    domain::{PredictionId, PredictionStatus},
    protocol::Prediction,
};
use tracing::debug;

use crate::{config::PollPolicy, error::ClientError};

/// Re-fetches `initial` through `fetch` until it reaches a terminal state.
///
/// Gives up with [`ClientError::Timeout`] once `policy.max_attempts` status
/// checks have been made, or when the next wait would overrun
/// `policy.timeout`.
pub async fn wait_for_completion<F, Fut>(
    initial: Prediction,
    policy: &PollPolicy,
    mut fetch: F,
) -> Result<Prediction, ClientError>
where
    F: FnMut(PredictionId) -> Fut,
    Fut: Future<Output = Result<Prediction, ClientError>>,
{
    let started = Instant::now();
    let mut prediction = initial;
    let mut attempts = 0u32;

    while !prediction.status.is_terminal() {
        let delay = policy.delay_for(attempts);
        if attempts >= policy.max_attempts || started.elapsed() + delay > policy.timeout {
            return Err(ClientError::Timeout {
                id: prediction.id,
                status: prediction.status,
                attempts,
                elapsed: started.elapsed(),
            });
        }

        tokio::time::sleep(delay).await;
        attempts += 1;

        let id = prediction.id.clone();
        prediction = fetch(id).await?;
        debug!(
            prediction_id = %prediction.id,
            status = %prediction.status,
            attempt = attempts,
            "polled try-on job"
        );
    }

    Ok(prediction)
}

/// Output image of a finished job.
pub fn result_url(prediction: &Prediction) -> Result<String, ClientError> {
    match prediction.status {
        PredictionStatus::Succeeded => prediction
            .output_url()
            .map(str::to_string)
            .ok_or_else(|| ClientError::MissingOutput {
                id: prediction.id.clone(),
            }),
        status => Err(ClientError::JobFailed {
            id: prediction.id.clone(),
            status,
            message: prediction
                .error_message()
                .unwrap_or_else(|| "no error reported".to_string()),
        }),
    }
}

#[cfg(test)]
#[path = "tests/poll_tests.rs"]
mod tests;
