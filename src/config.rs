use std::path::PathBuf;
use std::time::Duration;
use std::{env, io};

use tracing::debug;

pub const DEFAULT_INPUT_FILE: &str = "data.jsonl";
pub const DEFAULT_OUTPUT_FILE: &str = "output_with_coordinates.jsonl";
pub const DEFAULT_USER_AGENT: &str = "my_pharmacy_geocoder_app_v1";
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_REQUEST_DELAY_MS: u64 = 1_100;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub user_agent: String,
    pub geocoder_base_url: String,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocoder_base_url: DEFAULT_GEOCODER_BASE_URL.to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        load_dotenv_if_applicable();
        let defaults = Self::default();
        Self {
            input_path: parse_path("GEOCODER_INPUT_FILE", defaults.input_path),
            output_path: parse_path("GEOCODER_OUTPUT_FILE", defaults.output_path),
            user_agent: parse_string("GEOCODER_USER_AGENT", defaults.user_agent),
            geocoder_base_url: parse_string("GEOCODER_BASE_URL", defaults.geocoder_base_url),
            request_delay_ms: parse_u64("GEOCODER_REQUEST_DELAY_MS", defaults.request_delay_ms),
            request_timeout_secs: parse_u64("GEOCODER_TIMEOUT_SECS", defaults.request_timeout_secs)
                .max(1),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load in release build");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions) || parse_bool("ALLOW_DOTENV", false)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}

fn parse_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_string(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn parse_path(key: &str, default: PathBuf) -> PathBuf {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constant_configuration() {
        let config = AppConfig::default();
        assert_eq!(config.input_path, PathBuf::from("data.jsonl"));
        assert_eq!(
            config.output_path,
            PathBuf::from("output_with_coordinates.jsonl")
        );
        assert_eq!(config.user_agent, "my_pharmacy_geocoder_app_v1");
        assert_eq!(config.request_delay(), Duration::from_millis(1_100));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn reads_overrides_from_env() {
        env::set_var("GEOCODER_OUTPUT_FILE", "enriched.jsonl");
        env::set_var("GEOCODER_REQUEST_DELAY_MS", "250");
        env::set_var("GEOCODER_TIMEOUT_SECS", "0");
        env::set_var("GEOCODER_USER_AGENT", "   ");

        let config = AppConfig::from_env();

        assert_eq!(config.output_path, PathBuf::from("enriched.jsonl"));
        assert_eq!(config.request_delay_ms, 250);
        assert_eq!(config.request_timeout_secs, 1);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
