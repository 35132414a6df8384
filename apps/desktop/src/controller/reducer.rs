//! Wizard state and its transition function.

use serde::{Deserialize, Serialize};

use super::events::{Effect, ImageSelection, UiAction, GENERATION_FAILED_ALERT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Step {
    #[default]
    ChooseModel,
    ChooseCloth,
    ViewResult,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Self::ChooseModel => 1,
            Self::ChooseCloth => 2,
            Self::ViewResult => 3,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::ChooseModel => Some(Self::ChooseCloth),
            Self::ChooseCloth => Some(Self::ViewResult),
            Self::ViewResult => None,
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ChooseModel),
            2 => Ok(Self::ChooseCloth),
            3 => Ok(Self::ViewResult),
            other => Err(format!("wizard step must be 1..=3, got {other}")),
        }
    }
}

/// Which of the two mutually exclusive step-3 panels is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum ResultView {
    #[default]
    Loading,
    Result { url: String },
    /// Loading panel hidden after a failure; nothing to show.
    Hidden,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: Step,
    pub model_image: Option<ImageSelection>,
    pub cloth_image: Option<ImageSelection>,
    pub view: ResultView,
    pub alert: Option<String>,
}

impl WizardState {
    /// Whether the current step has its required selection.
    pub fn is_step_complete(&self) -> bool {
        match self.step {
            Step::ChooseModel => self.model_image.is_some(),
            Step::ChooseCloth => self.cloth_image.is_some(),
            Step::ViewResult => false,
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self.step {
            Step::ChooseModel if self.model_image.is_some() => "Ready for the next step",
            Step::ChooseCloth if self.cloth_image.is_some() => "Ready to generate try-on",
            _ => "Please complete the selection...",
        }
    }

    /// Active flags for the three step indicators.
    pub fn step_indicators(&self) -> [bool; 3] {
        let current = self.step.number();
        [1, 2, 3].map(|i| i <= current)
    }

    pub fn result_url(&self) -> Option<&str> {
        match &self.view {
            ResultView::Result { url } => Some(url),
            _ => None,
        }
    }
}

/// Applies `action` to `state`. Returns the side effect to run, if any.
///
/// Transitions only move forward. `Next` does nothing unless the current
/// step is complete; leaving step 2 starts generation.
pub fn reduce(state: &mut WizardState, action: UiAction) -> Option<Effect> {
    match action {
        UiAction::SelectModel(selection) => {
            if state.step == Step::ChooseModel {
                state.model_image = Some(selection);
            }
            None
        }
        UiAction::SelectCloth(selection) => {
            if state.step == Step::ChooseCloth {
                state.cloth_image = Some(selection);
            }
            None
        }
        UiAction::Next => advance(state),
        UiAction::GenerationSucceeded(url) => {
            if state.step == Step::ViewResult && state.view == ResultView::Loading {
                state.view = ResultView::Result { url };
            }
            None
        }
        UiAction::GenerationFailed(_) => {
            if state.step == Step::ViewResult && state.view == ResultView::Loading {
                state.view = ResultView::Hidden;
                state.alert = Some(GENERATION_FAILED_ALERT.to_string());
            }
            None
        }
        UiAction::Restart => {
            *state = WizardState::default();
            None
        }
    }
}

fn advance(state: &mut WizardState) -> Option<Effect> {
    if !state.is_step_complete() {
        return None;
    }
    let next = state.step.next()?;
    state.step = next;

    if next != Step::ViewResult {
        return None;
    }
    state.view = ResultView::Loading;
    let (model, cloth) = (state.model_image.as_ref()?, state.cloth_image.as_ref()?);
    Some(Effect::StartGeneration {
        model_image: model.data.clone(),
        cloth_image: cloth.data.clone(),
    })
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
