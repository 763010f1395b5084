use crate::filter::RadiusLimits;
use crate::geo::{BoundingBox, Coordinate};
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Log filter used when `FOODTRUCK_LOG_LEVEL` is unset.
    #[must_use]
    pub const fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "info",
            Environment::Test | Environment::Production => "warn",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub data_url: String,
    /// Optional `$limit` passed to the open-data endpoint.
    pub data_limit: Option<u32>,
    pub geocoder_url: String,
    /// Geocoding is disabled when no token is configured.
    pub geocoder_token: Option<String>,
    pub bounding_box: BoundingBox,
    pub map_center: Coordinate,
    pub radius: RadiusLimits,
    pub text_debounce_ms: u64,
    pub radius_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl AppConfig {
    /// The geocoder token, required by address searches.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `FOODTRUCK_GEOCODER_TOKEN`
    /// is not set.
    pub fn require_geocoder_token(&self) -> Result<&str, ConfigError> {
        self.geocoder_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FOODTRUCK_GEOCODER_TOKEN".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("data_url", &self.data_url)
            .field("data_limit", &self.data_limit)
            .field("geocoder_url", &self.geocoder_url)
            .field(
                "geocoder_token",
                &self.geocoder_token.as_ref().map(|_| "[redacted]"),
            )
            .field("bounding_box", &self.bounding_box)
            .field("map_center", &self.map_center)
            .field("radius", &self.radius)
            .field("text_debounce_ms", &self.text_debounce_ms)
            .field("radius_debounce_ms", &self.radius_debounce_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .finish()
    }
}
