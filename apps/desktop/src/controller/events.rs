//! Wizard actions and the side effects the reducer asks for.

use serde::{Deserialize, Serialize};

/// Alert shown when generation fails; details go to the log.
pub const GENERATION_FAILED_ALERT: &str = "Generation failed, check the logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// A local file read into a `data:` URL.
    Upload,
    /// A stock image referenced by URL.
    Preset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSelection {
    pub data: String,
    pub source: SelectionSource,
}

impl ImageSelection {
    pub fn upload(data_url: impl Into<String>) -> Self {
        Self {
            data: data_url.into(),
            source: SelectionSource::Upload,
        }
    }

    pub fn preset(url: impl Into<String>) -> Self {
        Self {
            data: url.into(),
            source: SelectionSource::Preset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SelectModel(ImageSelection),
    SelectCloth(ImageSelection),
    Next,
    GenerationSucceeded(String),
    GenerationFailed(String),
    Restart,
}

impl UiAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectModel(_) => "select_model",
            Self::SelectCloth(_) => "select_cloth",
            Self::Next => "next",
            Self::GenerationSucceeded(_) => "generation_succeeded",
            Self::GenerationFailed(_) => "generation_failed",
            Self::Restart => "restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartGeneration {
        model_image: String,
        cloth_image: String,
    },
}
