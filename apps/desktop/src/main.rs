use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use client_core::{
    config::{DEFAULT_API_ENDPOINT, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_MAX_POLL_INTERVAL},
    ClientConfig, PollPolicy, TryOnClient,
};
use tracing::info;

mod controller;
mod images;

use controller::{
    events::UiAction,
    orchestration::dispatch,
    reducer::WizardState,
};

/// Virtual try-on: pick a model photo and a garment, get the generated result.
#[derive(Parser, Debug)]
#[command(name = "tryon-desktop")]
struct Args {
    /// Model photo: local image file or http(s) URL.
    #[arg(long)]
    model: String,
    /// Garment photo: local image file or http(s) URL.
    #[arg(long)]
    cloth: String,
    #[arg(long, env = "TRYON_API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    endpoint: String,
    /// Skip the network and return a placeholder image.
    #[arg(long, env = "TRYON_USE_MOCK", default_value_t = true, action = ArgAction::Set)]
    mock: bool,
    #[arg(long, default_value_t = 3500)]
    mock_delay_ms: u64,
    #[arg(long, env = "TRYON_POLL_INTERVAL_MS", default_value_t = 2000)]
    poll_interval_ms: u64,
    #[arg(long, default_value_t = DEFAULT_MAX_POLL_ATTEMPTS)]
    max_poll_attempts: u32,
    #[arg(long, default_value_t = 180)]
    poll_timeout_secs: u64,
    /// Double the wait between status checks instead of keeping it fixed.
    #[arg(long)]
    exponential_backoff: bool,
    /// Save the generated image here.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let interval = Duration::from_millis(self.poll_interval_ms);
        let mut poll = if self.exponential_backoff {
            PollPolicy::exponential(interval, DEFAULT_MAX_POLL_INTERVAL)
        } else {
            PollPolicy {
                interval,
                ..PollPolicy::default()
            }
        };
        poll.max_attempts = self.max_poll_attempts;
        poll.timeout = Duration::from_secs(self.poll_timeout_secs);

        ClientConfig {
            api_endpoint: self.endpoint.clone(),
            use_mock: self.mock,
            mock_delay: Duration::from_millis(self.mock_delay_ms),
            poll,
            ..ClientConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let client = TryOnClient::new(args.client_config());
    let mut state = WizardState::default();

    let model = images::load_selection(&args.model).await?;
    dispatch(&mut state, &client, UiAction::SelectModel(model)).await;
    print_step(&state);
    dispatch(&mut state, &client, UiAction::Next).await;

    let cloth = images::load_selection(&args.cloth).await?;
    dispatch(&mut state, &client, UiAction::SelectCloth(cloth)).await;
    print_step(&state);

    info!(mock = client.config().use_mock, "generating try-on");
    dispatch(&mut state, &client, UiAction::Next).await;

    let Some(url) = state.result_url() else {
        bail!(state
            .alert
            .clone()
            .unwrap_or_else(|| "generation did not complete".to_string()));
    };
    println!("Try-on result: {url}");

    if let Some(path) = &args.output {
        let bytes = client.download(url).await?;
        tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        println!("Saved {} bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}

fn print_step(state: &WizardState) {
    let indicators: String = state
        .step_indicators()
        .iter()
        .map(|active| if *active { '●' } else { '○' })
        .collect();
    println!(
        "[{indicators}] step {}: {}",
        state.step.number(),
        state.status_text()
    );
}
