use std::{str::FromStr, time::Duration};

use crate::{connection::connection_state::ReconnectPolicy, error::ConfigError};

pub const DEFAULT_URL: &str = "ws://localhost:8080";
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: String,
    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Reads `COURIER_WS_URL`, `COURIER_MAX_RECONNECT_ATTEMPTS`,
    /// `COURIER_RECONNECT_DELAY_MS` and `COURIER_HEARTBEAT_INTERVAL_MS`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("COURIER_WS_URL") {
            config.url = url;
        }

        if let Some(attempts) = parse_var(&lookup, "COURIER_MAX_RECONNECT_ATTEMPTS")? {
            config.max_reconnect_attempts = attempts;
        }

        if let Some(delay) = parse_var::<u64>(&lookup, "COURIER_RECONNECT_DELAY_MS")? {
            config.reconnect_delay = Duration::from_millis(delay);
        }

        if let Some(interval) = parse_var::<u64>(&lookup, "COURIER_HEARTBEAT_INTERVAL_MS")? {
            config.heartbeat_interval = Duration::from_millis(interval);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::ZeroHeartbeatInterval);
        }

        Ok(())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.max_reconnect_attempts,
            delay: self.reconnect_delay,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value })
        })
        .transpose()
}
