use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORTAL_BASE_URL: &str = "https://sss.espe.edu.ec/StudentSelfService";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub portal_base_url: String,
    pub portal_user_agent: String,
    pub session_cookie_name: String,
    pub session_ttl_secs: u64,
    pub fallback_cookie: Option<String>,
    pub page_size: u32,
    pub upstream_timeout_secs: u64,
    pub filter_unscheduled: bool,
    pub expose_error_details: bool,
    pub warmup_session: bool,
    pub cors_allow_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            portal_base_url: DEFAULT_PORTAL_BASE_URL.to_string(),
            portal_user_agent: DEFAULT_USER_AGENT.to_string(),
            session_cookie_name: "JSESSIONID".to_string(),
            session_ttl_secs: 30 * 60,
            fallback_cookie: None,
            page_size: 10,
            upstream_timeout_secs: 30,
            filter_unscheduled: false,
            expose_error_details: false,
            warmup_session: false,
            cors_allow_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for anything missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        Ok(Config {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(get("PORT"), "PORT", defaults.server_port)?,
            portal_base_url: get("PORTAL_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.portal_base_url),
            portal_user_agent: get("PORTAL_USER_AGENT").unwrap_or(defaults.portal_user_agent),
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            session_ttl_secs: parse_or(
                get("SESSION_TTL_SECS"),
                "SESSION_TTL_SECS",
                defaults.session_ttl_secs,
            )?,
            fallback_cookie: get("PORTAL_FALLBACK_COOKIE"),
            page_size: parse_or(get("PORTAL_PAGE_SIZE"), "PORTAL_PAGE_SIZE", defaults.page_size)?,
            upstream_timeout_secs: parse_or(
                get("UPSTREAM_TIMEOUT_SECS"),
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout_secs,
            )?,
            filter_unscheduled: parse_flag(get("FILTER_UNSCHEDULED"), "FILTER_UNSCHEDULED")?,
            expose_error_details: parse_flag(
                get("EXPOSE_ERROR_DETAILS"),
                "EXPOSE_ERROR_DETAILS",
            )?,
            warmup_session: parse_flag(get("PORTAL_WARMUP"), "PORTAL_WARMUP")?,
            cors_allow_origin: get("CORS_ALLOW_ORIGIN"),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn entry_url(&self) -> String {
        format!(
            "{}/ssb/studentAttendanceTracking/attendanceTracking",
            self.portal_base_url
        )
    }

    pub fn sections_url(&self) -> String {
        format!(
            "{}/ssb/studentAttendanceTracking/getRegisteredSections",
            self.portal_base_url
        )
    }

    pub fn login_url(&self) -> String {
        format!("{}/login/auth", self.portal_base_url)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}

fn parse_flag(value: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.session_ttl(), Duration::from_secs(1800));
        assert_eq!(config.portal_base_url, DEFAULT_PORTAL_BASE_URL);
        assert!(!config.filter_unscheduled);
        assert!(config.fallback_cookie.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("SESSION_TTL_SECS", "900"),
            ("PORTAL_BASE_URL", "http://127.0.0.1:9000/"),
            ("FILTER_UNSCHEDULED", "TRUE"),
            ("PORTAL_FALLBACK_COOKIE", "  "),
        ]))
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.session_ttl_secs, 900);
        assert_eq!(config.portal_base_url, "http://127.0.0.1:9000");
        assert_eq!(
            config.sections_url(),
            "http://127.0.0.1:9000/ssb/studentAttendanceTracking/getRegisteredSections"
        );
        assert!(config.filter_unscheduled);
        assert!(config.fallback_cookie.is_none());
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "tres mil")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[("EXPOSE_ERROR_DETAILS", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "EXPOSE_ERROR_DETAILS", .. }));
    }
}
