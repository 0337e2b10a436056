use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root application configuration. Loaded from an optional
/// `promo-builder.toml` and environment variables with the prefix
/// `PROMO_BUILDER__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
    #[serde(default)]
    pub eligibility: EligibilityConfig,
}

/// Endpoint URLs seeded into every new draft.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationsConfig {
    #[serde(default = "default_eligibility_url")]
    pub eligibility_url: String,
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityMode {
    /// Randomized placeholder outcome.
    Mock,
    /// POST to the draft's eligibility endpoint.
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityConfig {
    #[serde(default = "default_eligibility_mode")]
    pub mode: EligibilityMode,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Probability of an accept outcome in mock mode.
    #[serde(default = "default_mock_accept_rate")]
    pub mock_accept_rate: f64,
}

// Default functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_eligibility_url() -> String {
    "https://api.publisher.com/promo/eligibility".to_string()
}
fn default_webhook_url() -> String {
    "https://api.publisher.com/promo/webhook".to_string()
}
fn default_eligibility_mode() -> EligibilityMode {
    EligibilityMode::Http
}
fn default_timeout_ms() -> u64 {
    2000
}
fn default_mock_accept_rate() -> f64 {
    0.7
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            integrations: IntegrationsConfig::default(),
            eligibility: EligibilityConfig::default(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            eligibility_url: default_eligibility_url(),
            webhook_url: default_webhook_url(),
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            mode: default_eligibility_mode(),
            timeout_ms: default_timeout_ms(),
            mock_accept_rate: default_mock_accept_rate(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `promo-builder.toml` (if present) and the
    /// environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(Path::new("promo-builder.toml"), false)
    }

    /// Load configuration from an explicitly named file and the environment.
    /// The file must exist. Environment variables win over file values.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load_with(path, true)
    }

    fn load_with(path: &Path, required: bool) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix("PROMO_BUILDER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
