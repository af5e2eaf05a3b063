use std::env;
use std::time::Duration;

/// Default upstream timeout applied when a forward request carries none.
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_VISION_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_VISION_API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upstream_timeout: Duration,
    /// Base URL used by `/api/v1/*` when the caller sends no `x-target-base-url`.
    pub default_base_url: Option<String>,
    pub vision_api_url: String,
    pub vision_model: String,
    /// Name of the environment variable holding the vision key. The key
    /// itself is looked up on every request, never cached here.
    pub vision_api_key_var: String,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            upstream_timeout: Duration::from_millis(
                env::var("FORGE_UPSTREAM_TIMEOUT_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_MS),
            ),
            default_base_url: env::var("FORGE_DEFAULT_BASE_URL")
                .ok()
                .filter(|u| !u.trim().is_empty()),
            vision_api_url: env::var("VISION_API_URL")
                .unwrap_or_else(|_| DEFAULT_VISION_API_URL.to_string()),
            vision_model: env::var("VISION_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
            vision_api_key_var: env::var("VISION_API_KEY_VAR")
                .unwrap_or_else(|_| DEFAULT_VISION_API_KEY_VAR.to_string()),
            json_logs: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Reads the vision API key from the process environment.
    pub fn vision_api_key(&self) -> Option<String> {
        env::var(&self.vision_api_key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            default_base_url: None,
            vision_api_url: DEFAULT_VISION_API_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            vision_api_key_var: DEFAULT_VISION_API_KEY_VAR.to_string(),
            json_logs: false,
        }
    }
}
