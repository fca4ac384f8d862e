use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default minimum gap between the starts of two consecutive fetches.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// Global configuration loaded from `~/.config/zipdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZipdlConfig {
    /// Minimum delay in milliseconds between successive file fetches.
    pub rate_limit_ms: u64,
    /// TCP/TLS connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Optional whole-request timeout in seconds (None = no limit, bodies may be large).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Optional User-Agent header sent with every fetch.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional size of the buffer in front of the archive file (None = library default).
    #[serde(default)]
    pub write_buffer_bytes: Option<usize>,
    /// Ignore HTTP(S)_PROXY from the environment.
    #[serde(default)]
    pub no_proxy: bool,
}

impl Default for ZipdlConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            connect_timeout_secs: 30,
            request_timeout_secs: None,
            user_agent: None,
            write_buffer_bytes: None,
            no_proxy: false,
        }
    }
}

impl ZipdlConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// HTTP client settings derived from this config.
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
            no_proxy: self.no_proxy,
        }
    }
}

/// Settings for the HTTP client used to fetch archive entries.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub no_proxy: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        ZipdlConfig::default().http_options()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("zipdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ZipdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ZipdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ZipdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ZipdlConfig::default();
        assert_eq!(cfg.rate_limit_ms, 1000);
        assert_eq!(cfg.rate_limit(), Duration::from_secs(1));
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert!(cfg.request_timeout_secs.is_none());
        assert!(cfg.user_agent.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ZipdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ZipdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.rate_limit_ms, cfg.rate_limit_ms);
        assert_eq!(parsed.connect_timeout_secs, cfg.connect_timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            rate_limit_ms = 250
            connect_timeout_secs = 5
            request_timeout_secs = 600
            user_agent = "zipdl-test/1.0"
            write_buffer_bytes = 65536
        "#;
        let cfg: ZipdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.rate_limit(), Duration::from_millis(250));
        assert_eq!(cfg.write_buffer_bytes, Some(65536));
        let http = cfg.http_options();
        assert_eq!(http.connect_timeout, Duration::from_secs(5));
        assert_eq!(http.request_timeout, Some(Duration::from_secs(600)));
        assert_eq!(http.user_agent.as_deref(), Some("zipdl-test/1.0"));
    }

    #[test]
    fn config_toml_optional_fields_missing() {
        let toml = r#"
            rate_limit_ms = 0
            connect_timeout_secs = 10
        "#;
        let cfg: ZipdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.rate_limit(), Duration::ZERO);
        assert!(cfg.request_timeout_secs.is_none());
        assert!(cfg.write_buffer_bytes.is_none());
        assert!(!cfg.no_proxy);
    }
}
