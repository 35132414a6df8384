use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use shared::{domain::PredictionId, protocol::CreatePredictionRequest};

use crate::{
    api::{ApiContext, ModelParams},
    config::Settings,
    provider::{PredictionProvider, ProviderError},
};

/// In-memory provider that records submissions and replays a canned answer.
pub(crate) struct FakeProvider {
    pub(crate) submitted: Mutex<Vec<CreatePredictionRequest>>,
    pub(crate) fetched: Mutex<Vec<PredictionId>>,
    reject_with: Option<(u16, String)>,
}

impl FakeProvider {
    pub(crate) fn ok() -> Arc<Self> {
        Arc::new(Self {
            submitted: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
            reject_with: None,
        })
    }

    pub(crate) fn rejecting(status: u16, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            submitted: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
            reject_with: Some((status, body.into())),
        })
    }

    fn outcome(&self, job: Value) -> Result<Value, ProviderError> {
        match &self.reject_with {
            Some((status, body)) => Err(ProviderError::Rejected {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(job),
        }
    }
}

#[async_trait]
impl PredictionProvider for FakeProvider {
    async fn create_prediction(
        &self,
        request: &CreatePredictionRequest,
    ) -> Result<Value, ProviderError> {
        self.submitted.lock().expect("lock").push(request.clone());
        self.outcome(serde_json::json!({
            "id": "fake-job",
            "status": "starting",
            "output": null,
            "urls": {
                "get": "https://api.replicate.com/v1/predictions/fake-job",
                "cancel": "https://api.replicate.com/v1/predictions/fake-job/cancel"
            }
        }))
    }

    async fn get_prediction(&self, id: &PredictionId) -> Result<Value, ProviderError> {
        self.fetched.lock().expect("lock").push(id.clone());
        self.outcome(serde_json::json!({
            "id": id.0,
            "status": "succeeded",
            "output": ["https://replicate.delivery/fake/out.png"]
        }))
    }
}

pub(crate) fn context_with(provider: Option<Arc<FakeProvider>>) -> ApiContext {
    ApiContext {
        provider: provider.map(|p| p as Arc<dyn PredictionProvider>),
        model: ModelParams::from_settings(&Settings::default()),
    }
}

pub(crate) fn try_on_body() -> String {
    serde_json::json!({
        "model_image": "data:image/png;base64,bW9kZWw=",
        "cloth_image": "https://example.com/presets/shirt.png",
    })
    .to_string()
}
