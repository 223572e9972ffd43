//! Endpoint configuration read from `NSM_`-prefixed environment variables

pub mod service;

pub use service::{format_mac, parse_services, ServiceConfig};

use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::{CoreError, Result};

const ENV_NAME: &str = "NSM_NAME";
const ENV_CONNECT_TO: &str = "NSM_CONNECT_TO";
const ENV_MAX_TOKEN_LIFETIME: &str = "NSM_MAX_TOKEN_LIFETIME";
const ENV_LOG_LEVEL: &str = "NSM_LOG_LEVEL";
const ENV_SERVICES: &str = "NSM_SERVICES";

/// Endpoint configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Name the endpoint registers under
    pub name: String,
    /// URL of the network service mesh manager
    pub connect_to: String,
    /// Lifetime of the endpoint advertisement
    pub max_token_lifetime: Duration,
    /// Log level
    pub log_level: Level,
    /// Services served by this endpoint
    pub services: Vec<ServiceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            connect_to: default_connect_to(),
            max_token_lifetime: default_max_token_lifetime(),
            log_level: Level::INFO,
            services: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps variable names to values
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(name) = lookup(ENV_NAME) {
            config.name = name;
        }
        if let Some(connect_to) = lookup(ENV_CONNECT_TO) {
            config.connect_to = connect_to;
        }
        if let Some(lifetime) = lookup(ENV_MAX_TOKEN_LIFETIME) {
            config.max_token_lifetime = parse_duration(&lifetime).ok_or_else(|| {
                CoreError::InvalidConfiguration(format!(
                    "{}: invalid duration {:?}",
                    ENV_MAX_TOKEN_LIFETIME, lifetime
                ))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = parse_level(&level).ok_or_else(|| {
                CoreError::InvalidConfiguration(format!("{}: invalid log level {}", ENV_LOG_LEVEL, level))
            })?;
        }
        if let Some(services) = lookup(ENV_SERVICES) {
            config.services = parse_services(&services)?;
        }

        Ok(config)
    }
}

/// Parse a log level. Besides tracing's own names this accepts `WARNING`,
/// `FATAL` and `PANIC`, which map to the nearest tracing level.
pub fn parse_level(value: &str) -> Option<Level> {
    let value = value.trim().to_ascii_uppercase();
    let name = match value.as_str() {
        "WARNING" => "WARN",
        "FATAL" | "PANIC" => "ERROR",
        other => other,
    };
    Level::from_str(name).ok()
}

/// Parse a duration such as `10m`, `1h30m`, `45s` or `500ms`
pub fn parse_duration(value: &str) -> Option<Duration> {
    let mut rest = value.trim();
    if rest.is_empty() {
        return None;
    }
    if rest == "0" {
        return Some(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits_end == 0 {
            return None;
        }
        let amount: u32 = rest[..digits_end].parse().ok()?;
        rest = &rest[digits_end..];

        let unit_end = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = match &rest[..unit_end] {
            "h" => Duration::from_secs(3600),
            "m" => Duration::from_secs(60),
            "s" => Duration::from_secs(1),
            "ms" => Duration::from_millis(1),
            _ => return None,
        };
        total = total.checked_add(unit.checked_mul(amount)?)?;
        rest = &rest[unit_end..];
    }
    Some(total)
}

fn default_name() -> String {
    "vfio-server".to_string()
}

fn default_connect_to() -> String {
    "unix:///var/lib/networkservicemesh/nsm.io.sock".to_string()
}

fn default_max_token_lifetime() -> Duration {
    Duration::from_secs(10 * 60)
}
