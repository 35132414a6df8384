//! Runs the effects the reducer emits and feeds their outcome back in.

use client_core::TryOnClient;
use tracing::{debug, error};

use super::{
    events::{Effect, UiAction},
    reducer::{reduce, WizardState},
};

/// Applies `action`, then executes any resulting effect to completion.
pub async fn dispatch(state: &mut WizardState, client: &TryOnClient, action: UiAction) {
    debug!(action = action.name(), step = state.step.number(), "wizard action");
    if let Some(effect) = reduce(state, action) {
        let outcome = run_effect(client, effect).await;
        reduce(state, outcome);
    }
}

pub async fn run_effect(client: &TryOnClient, effect: Effect) -> UiAction {
    match effect {
        Effect::StartGeneration {
            model_image,
            cloth_image,
        } => match client.generate_try_on(&model_image, &cloth_image).await {
            Ok(url) => UiAction::GenerationSucceeded(url),
            Err(err) => {
                error!(%err, "API error");
                UiAction::GenerationFailed(err.to_string())
            }
        },
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
