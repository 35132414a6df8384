use std::time::Duration;

/// Proxy endpoint used when nothing else is configured.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.your-domain.com/v1/try-on";
/// Placeholder returned in mock mode.
pub const MOCK_RESULT_URL: &str =
    "https://images.unsplash.com/photo-1550639525-c97d455acf74?q=80&w=1200&auto=format&fit=crop";
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(3500);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Wait `interval` between every status check.
    Fixed,
    /// Double the wait after each check, never exceeding `max_interval`.
    Exponential { max_interval: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff: Backoff,
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            backoff: Backoff::Fixed,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollPolicy {
    pub fn exponential(interval: Duration, max_interval: Duration) -> Self {
        Self {
            interval,
            backoff: Backoff::Exponential { max_interval },
            ..Self::default()
        }
    }

    /// Wait before status check number `attempt` (zero based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential { max_interval } => {
                let factor = 2u32.saturating_pow(attempt);
                self.interval
                    .checked_mul(factor)
                    .unwrap_or(max_interval)
                    .min(max_interval)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_endpoint: String,
    pub use_mock: bool,
    pub mock_delay: Duration,
    pub mock_result_url: String,
    pub poll: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.into(),
            use_mock: true,
            mock_delay: DEFAULT_MOCK_DELAY,
            mock_result_url: MOCK_RESULT_URL.into(),
            poll: PollPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn live(api_endpoint: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            use_mock: false,
            ..Self::default()
        }
    }
}
