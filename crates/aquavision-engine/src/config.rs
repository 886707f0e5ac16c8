use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MAX_IMAGE_DIM: u32 = 2048;

const REQUEST_TIMEOUT_S: (f64, f64, f64) = (90.0, 15.0, 300.0);
const TRANSPORT_RETRIES: (f64, f64, f64) = (2.0, 0.0, 4.0);
const RETRY_BACKOFF_S: (f64, f64, f64) = (1.2, 0.1, 10.0);
const MAX_IMAGE_DIM: (f64, f64, f64) = (2048.0, 256.0, 4096.0);

/// Client settings resolved from the environment. Numeric values are clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub request_timeout_s: f64,
    pub transport_retries: usize,
    pub retry_backoff_s: f64,
    pub max_image_dim: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY")),
            api_base: non_empty("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            text_model: non_empty("AQUAVISION_TEXT_MODEL"),
            image_model: non_empty("AQUAVISION_IMAGE_MODEL"),
            request_timeout_s: clamped(
                non_empty("AQUAVISION_REQUEST_TIMEOUT").as_deref(),
                REQUEST_TIMEOUT_S,
            ),
            transport_retries: clamped(
                non_empty("AQUAVISION_TRANSPORT_RETRIES").as_deref(),
                TRANSPORT_RETRIES,
            )
            .round() as usize,
            retry_backoff_s: clamped(
                non_empty("AQUAVISION_RETRY_BACKOFF").as_deref(),
                RETRY_BACKOFF_S,
            ),
            max_image_dim: clamped(
                non_empty("AQUAVISION_MAX_IMAGE_DIM").as_deref(),
                MAX_IMAGE_DIM,
            )
            .round() as u32,
        }
    }

    pub fn with_request_timeout(mut self, seconds: f64) -> Self {
        let (_, min, max) = REQUEST_TIMEOUT_S;
        if seconds.is_finite() {
            self.request_timeout_s = seconds.clamp(min, max);
        }
        self
    }

    pub fn with_text_model(mut self, model: Option<String>) -> Self {
        if model.is_some() {
            self.text_model = model;
        }
        self
    }

    pub fn with_image_model(mut self, model: Option<String>) -> Self {
        if model.is_some() {
            self.image_model = model;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_s)
    }
}

fn clamped(raw: Option<&str>, (default, min, max): (f64, f64, f64)) -> f64 {
    raw.and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(min, max))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{ClientConfig, DEFAULT_API_BASE};

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.request_timeout_s, 90.0);
        assert_eq!(config.transport_retries, 2);
        assert_eq!(config.retry_backoff_s, 1.2);
        assert_eq!(config.max_image_dim, 2048);
    }

    #[test]
    fn gemini_key_wins_over_google_key() {
        let config = config_from(&[("GEMINI_API_KEY", " g-key "), ("GOOGLE_API_KEY", "o-key")]);
        assert_eq!(config.api_key.as_deref(), Some("g-key"));
        let config = config_from(&[("GEMINI_API_KEY", " "), ("GOOGLE_API_KEY", "o-key")]);
        assert_eq!(config.api_key.as_deref(), Some("o-key"));
    }

    #[test]
    fn numeric_settings_are_clamped() {
        let config = config_from(&[
            ("AQUAVISION_REQUEST_TIMEOUT", "5"),
            ("AQUAVISION_TRANSPORT_RETRIES", "9"),
            ("AQUAVISION_RETRY_BACKOFF", "0.01"),
            ("AQUAVISION_MAX_IMAGE_DIM", "100000"),
            ("GEMINI_API_BASE", "http://localhost:8080/v1beta/"),
        ]);
        assert_eq!(config.request_timeout_s, 15.0);
        assert_eq!(config.transport_retries, 4);
        assert_eq!(config.retry_backoff_s, 0.1);
        assert_eq!(config.max_image_dim, 4096);
        assert_eq!(config.api_base, "http://localhost:8080/v1beta");
    }

    #[test]
    fn unparsable_values_fall_back_to_defaults() {
        let config = config_from(&[("AQUAVISION_REQUEST_TIMEOUT", "soon")]);
        assert_eq!(config.request_timeout_s, 90.0);
    }

    #[test]
    fn overrides_respect_bounds() {
        let config = ClientConfig::default()
            .with_request_timeout(1000.0)
            .with_text_model(Some("gemini-2.5-pro".to_string()))
            .with_image_model(None);
        assert_eq!(config.request_timeout_s, 300.0);
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
        assert_eq!(config.text_model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(config.image_model, None);
    }
}
