use std::{fs, time::Duration};

use serde::Deserialize;

pub const DEFAULT_MODEL_VERSION: &str =
    "c871e91c0372f922b959e00877f930b9f498cb962d663922aa3b35c1738ce913";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub replicate_api_url: String,
    pub replicate_api_token: Option<String>,
    pub model_version: String,
    pub garment_description: String,
    pub crop: bool,
    pub seed: i64,
    pub upstream_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            replicate_api_url: "https://api.replicate.com/v1".into(),
            replicate_api_token: None,
            model_version: DEFAULT_MODEL_VERSION.into(),
            garment_description: "upper_body".into(),
            crop: false,
            seed: 42,
            upstream_timeout_seconds: 60,
        }
    }
}

impl Settings {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}

/// Keys accepted in `server.toml`. The API token is read from the environment only.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    replicate_api_url: Option<String>,
    model_version: Option<String>,
    garment_description: Option<String>,
    crop: Option<bool>,
    seed: Option<i64>,
    upstream_timeout_seconds: Option<u64>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => tracing::warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    // Plain names first, `APP__` names win.
    let lookup = |plain: &str, prefixed: &str| env(prefixed).or_else(|| env(plain));

    if let Some(v) = lookup("SERVER_BIND", "APP__BIND_ADDR") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("REPLICATE_API_URL", "APP__REPLICATE_API_URL") {
        settings.replicate_api_url = v;
    }
    if let Some(v) = lookup("REPLICATE_API_TOKEN", "APP__REPLICATE_API_TOKEN") {
        settings.replicate_api_token = Some(v);
    }
    if let Some(v) = env("APP__MODEL_VERSION") {
        settings.model_version = v;
    }
    if let Some(v) = env("APP__GARMENT_DESCRIPTION") {
        settings.garment_description = v;
    }
    if let Some(v) = env("APP__CROP") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.crop = parsed;
        }
    }
    if let Some(v) = env("APP__SEED") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.seed = parsed;
        }
    }
    if let Some(v) = env("APP__UPSTREAM_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.upstream_timeout_seconds = parsed;
        }
    }

    settings.replicate_api_token = settings
        .replicate_api_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    settings.replicate_api_url = settings
        .replicate_api_url
        .trim_end_matches('/')
        .to_string();

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.replicate_api_url {
        settings.replicate_api_url = v;
    }
    if let Some(v) = file_cfg.model_version {
        settings.model_version = v;
    }
    if let Some(v) = file_cfg.garment_description {
        settings.garment_description = v;
    }
    if let Some(v) = file_cfg.crop {
        settings.crop = v;
    }
    if let Some(v) = file_cfg.seed {
        settings.seed = v;
    }
    if let Some(v) = file_cfg.upstream_timeout_seconds {
        settings.upstream_timeout_seconds = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
