use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_TASKROUTER_BASE: &str = "https://taskrouter.twilio.com";
pub const DEFAULT_NUMVERIFY_API_URL: &str = "http://apilayer.net/api/validate";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_LOG_PAGE_SIZE: u32 = 20;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set!")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// What the friendly-name lookup answers with when a number is not in the account's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FriendlyNameFallback {
    /// Answer "Unknown phone number".
    #[default]
    Unknown,
    /// Echo the queried number back.
    Echo,
}

impl FriendlyNameFallback {
    pub fn resolve(self, phone_number: &str) -> String {
        match self {
            FriendlyNameFallback::Unknown => "Unknown phone number".to_string(),
            FriendlyNameFallback::Echo => phone_number.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_workspace_sid: String,
    pub numverify_api_key: String,
    pub twilio_api_base: String,
    pub taskrouter_base: String,
    pub numverify_api_url: String,
    pub bind_addr: SocketAddr,
    /// Records fetched per call/SMS/task log request.
    pub log_page_size: u32,
    pub upstream_timeout: Duration,
    pub friendly_name_fallback: FriendlyNameFallback,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bind_addr = or_default("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_addr,
        })?;

        let page_size = or_default("LOG_PAGE_SIZE", &DEFAULT_LOG_PAGE_SIZE.to_string());
        let log_page_size = match page_size.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "LOG_PAGE_SIZE",
                    value: page_size,
                })
            }
        };

        let timeout = or_default(
            "UPSTREAM_TIMEOUT_SECS",
            &DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string(),
        );
        // Zero would make every outbound call fail immediately.
        let upstream_timeout = match timeout.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::Invalid {
                    key: "UPSTREAM_TIMEOUT_SECS",
                    value: timeout,
                })
            }
        };

        let friendly_name_fallback = match or_default("FRIENDLY_NAME_FALLBACK", "unknown")
            .to_ascii_lowercase()
            .as_str()
        {
            "unknown" => FriendlyNameFallback::Unknown,
            "echo" => FriendlyNameFallback::Echo,
            other => {
                return Err(ConfigError::Invalid {
                    key: "FRIENDLY_NAME_FALLBACK",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            twilio_account_sid: required("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: required("TWILIO_AUTH_TOKEN")?,
            twilio_workspace_sid: required("TWILIO_WORKSPACE_SID")?,
            numverify_api_key: required("NUMVERIFY_API_KEY")?,
            twilio_api_base: trim_base(or_default("TWILIO_API_BASE", DEFAULT_TWILIO_API_BASE)),
            taskrouter_base: trim_base(or_default(
                "TWILIO_TASKROUTER_BASE",
                DEFAULT_TASKROUTER_BASE,
            )),
            numverify_api_url: or_default("NUMVERIFY_API_URL", DEFAULT_NUMVERIFY_API_URL),
            bind_addr,
            log_page_size,
            upstream_timeout,
            friendly_name_fallback,
        })
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}
