use reqwest::Client;
use shared::{
    domain::PredictionId,
    error::ApiError,
    protocol::{Prediction, TryOnRequest},
};
use tracing::{error, info, warn};
use url::Url;

pub mod config;
pub mod error;
pub mod poll;

pub use config::{Backoff, ClientConfig, PollPolicy, MOCK_RESULT_URL};
pub use error::ClientError;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Talks to the try-on proxy: submits a job and waits for its result image.
pub struct TryOnClient {
    http: Client,
    config: ClientConfig,
}

impl TryOnClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    /// Uses a caller-built `reqwest` client, e.g. one with its own proxy or
    /// TLS settings.
    pub fn with_http_client(http: Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves to the URL of the generated try-on image.
    ///
    /// In mock mode no request is made: the configured placeholder comes back
    /// after `mock_delay`.
    pub async fn generate_try_on(&self, model_image: &str, cloth_image: &str) -> Result<String> {
        if self.config.use_mock {
            info!(delay = ?self.config.mock_delay, "mock mode: skipping try-on request");
            tokio::time::sleep(self.config.mock_delay).await;
            return Ok(self.config.mock_result_url.clone());
        }

        self.run_job(model_image, cloth_image).await.map_err(|err| {
            error!(%err, "try-on generation failed");
            err
        })
    }

    async fn run_job(&self, model_image: &str, cloth_image: &str) -> Result<String> {
        let created = self
            .submit(&TryOnRequest {
                model_image: model_image.to_string(),
                cloth_image: cloth_image.to_string(),
            })
            .await?;
        info!(prediction_id = %created.id, status = %created.status, "try-on job submitted");

        let finished =
            poll::wait_for_completion(created, &self.config.poll, |id| self.fetch_prediction(id))
                .await?;
        if let Some(run_time) = finished.run_time() {
            info!(
                prediction_id = %finished.id,
                seconds = run_time.num_seconds(),
                "try-on job finished"
            );
        }
        poll::result_url(&finished)
    }

    pub async fn submit(&self, request: &TryOnRequest) -> Result<Prediction> {
        let endpoint = Url::parse(&self.config.api_endpoint)?;
        let res = self.http.post(endpoint).json(request).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ClientError::Submit {
                status: status.as_u16(),
                message: error_text(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_prediction(&self, id: PredictionId) -> Result<Prediction> {
        let url = self.status_url(&id)?;
        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            warn!(prediction_id = %id, status = status.as_u16(), "status check failed");
            return Err(ClientError::Status {
                id,
                status: status.as_u16(),
                message: error_text(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Downloads the finished image, e.g. to save it locally.
    pub async fn download(&self, image_url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .http
            .get(Url::parse(image_url)?)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    /// `{api_endpoint}/{id}`, the proxy's status route.
    pub fn status_url(&self, id: &PredictionId) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_endpoint)?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidEndpoint(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .push(&id.0);
        Ok(url)
    }
}

fn error_text(body: &str) -> Option<String> {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return Some(api_error.error);
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
