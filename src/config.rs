use crate::messages::Locale;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|val| val.trim().parse().ok())
}

/// How often and how long an operation is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the provider reports completion.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(10),
            max_attempts: Some(90),
        }
    }
}

impl PollPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn unbounded(self) -> Self {
        self.with_max_attempts(None)
    }
}

#[derive(Debug, Clone)]
pub struct VeoConfig {
    pub base_url: String,
    pub poll: PollPolicy,
}

impl Default for VeoConfig {
    fn default() -> Self {
        VeoConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

impl VeoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("VEO_API_BASE_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);
        let interval = env_u64("VEO_POLL_INTERVAL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll.interval);
        let max_attempts = match env_u64("VEO_MAX_POLLS") {
            Some(0) => None,
            Some(n) => Some(n.min(u32::MAX as u64) as u32),
            None => defaults.poll.max_attempts,
        };

        VeoConfig {
            base_url,
            poll: PollPolicy {
                interval,
                max_attempts,
            },
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Pause between two items.
    pub item_delay: Duration,
    /// How long the completion status stays up before it is cleared.
    pub status_clear_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            item_delay: Duration::from_secs(10),
            status_clear_delay: Duration::from_secs(5),
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        BatchConfig {
            item_delay: env_u64("VEO_BATCH_DELAY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.item_delay),
            status_clear_delay: env_u64("VEO_STATUS_CLEAR_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.status_clear_delay),
        }
    }

    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn with_status_clear_delay(mut self, delay: Duration) -> Self {
        self.status_clear_delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Takes precedence over the stored key when set.
    pub api_key: Option<String>,
    pub veo: VeoConfig,
    pub batch: BatchConfig,
    pub output_dir: PathBuf,
    pub credential_path: PathBuf,
    pub locale: Locale,
}

pub fn default_credential_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("veogen")
        .join("credentials.json")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            veo: VeoConfig::default(),
            batch: BatchConfig::default(),
            output_dir: PathBuf::from("."),
            credential_path: default_credential_path(),
            locale: Locale::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let output_dir = env::var("VEO_OUTPUT_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let credential_path = env::var("VEO_CREDENTIAL_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_credential_path);
        let locale = env::var("VEO_LOCALE")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or_default();

        Config {
            api_key,
            veo: VeoConfig::from_env(),
            batch: BatchConfig::from_env(),
            output_dir,
            credential_path,
            locale,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_veo(mut self, config: VeoConfig) -> Self {
        self.veo = config;
        self
    }

    pub fn with_batch(mut self, config: BatchConfig) -> Self {
        self.batch = config;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_path = path.into();
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}
