use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-preview:thinking";
const DEFAULT_APP_TITLE: &str = "Prompt Relay";

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    // Sent as `HTTP-Referer` for OpenRouter app attribution.
    pub referer: String,
    pub app_title: String,
    // Total request timeout. `None` leaves the HTTP client default in place.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENROUTER_API_KEY").ok_or_else(|| {
            anyhow!("OPENROUTER_API_KEY not found in .env file or environment variables")
        })?;

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().with_context(|| {
                    format!("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds, got {:?}", raw)
                })?;
                if secs == 0 {
                    bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let base_url = get("OPENROUTER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "public".to_string())),
            upstream: UpstreamConfig {
                base_url,
                api_key,
                model: get("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                referer: get("OPENROUTER_REFERER")
                    .unwrap_or_else(|| format!("http://localhost:{}", port)),
                app_title: get("OPENROUTER_APP_TITLE")
                    .unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
                timeout,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn blank_api_key_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("OPENROUTER_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("OPENROUTER_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.upstream.api_key, "sk-test");
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.model, DEFAULT_MODEL);
        assert_eq!(config.upstream.referer, "http://localhost:3000");
        assert!(config.upstream.timeout.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("OPENROUTER_BASE_URL", "http://localhost:9999/v1/"),
            ("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            ("UPSTREAM_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream.base_url, "http://localhost:9999/v1");
        assert_eq!(config.upstream.model, "openai/gpt-4o-mini");
        assert_eq!(config.upstream.referer, "http://localhost:8080");
        assert_eq!(config.upstream.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(Config::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("PORT", "eighty"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("UPSTREAM_TIMEOUT_SECS", "0"),
        ]))
        .is_err());
    }
}
