// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! The bridge reads a TOML file describing the broker connection and the
//! thermostats to expose. Everything is validated before any thermostat is
//! constructed.
//!
//! # Examples
//!
//! ```
//! use besmart_bridge::config::BridgeConfig;
//!
//! let config = BridgeConfig::from_toml_str(r#"
//!     [broker]
//!     host = "192.168.1.50"
//!     username = "user"
//!     password = "secret"
//!
//!     [[thermostats]]
//!     wifi_box_id = "0012AB"
//!     thermostat_id = "4"
//! "#).unwrap();
//!
//! assert_eq!(config.broker.port, 1883);
//! assert_eq!(config.thermostats[0].name, "Besmart Thermostat");
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::types::{ThermostatId, is_topic_level};

/// Default display name of a thermostat.
pub const DEFAULT_NAME: &str = "Besmart Thermostat";

/// Default room label of a thermostat.
pub const DEFAULT_ROOM: &str = "room";

/// Top-level bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Broker connection settings.
    pub broker: BrokerSettings,
    /// Thermostats to expose.
    #[serde(default)]
    pub thermostats: Vec<ThermostatConfig>,
    /// Event loop reconnection policy.
    #[serde(default)]
    pub reconnection: ReconnectionPolicy,
}

impl BridgeConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, is not valid TOML,
    /// or fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a configuration string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the string is not valid TOML or fails
    /// validation.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every required setting is present.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.broker.validate()?;
        if self.thermostats.is_empty() {
            return Err(ConfigError::MissingField("thermostats".to_string()));
        }
        for (index, thermostat) in self.thermostats.iter().enumerate() {
            thermostat.validate(index)?;
        }
        Ok(())
    }
}

/// Broker connection settings.
#[derive(Clone, Deserialize)]
pub struct BrokerSettings {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Broker user name.
    pub username: String,
    /// Broker password.
    pub password: String,
}

fn default_port() -> u16 {
    1883
}

impl BrokerSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        require("broker.host", &self.host)?;
        require("broker.username", &self.username)?;
        require("broker.password", &self.password)?;
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BrokerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One configured thermostat.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThermostatConfig {
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Room label.
    #[serde(default = "default_room")]
    pub room: String,
    /// Wi-Fi box the thermostat is paired with.
    pub wifi_box_id: String,
    /// Thermostat number on the box.
    pub thermostat_id: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_room() -> String {
    DEFAULT_ROOM.to_string()
}

impl ThermostatConfig {
    /// Creates a configuration with the default name and room.
    #[must_use]
    pub fn new(wifi_box_id: impl Into<String>, thermostat_id: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            room: default_room(),
            wifi_box_id: wifi_box_id.into(),
            thermostat_id: thermostat_id.into(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the room label.
    #[must_use]
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    /// Returns the identity of the configured thermostat.
    #[must_use]
    pub fn id(&self) -> ThermostatId {
        ThermostatId::new(&self.wifi_box_id, &self.thermostat_id)
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        require_topic_level(&format!("thermostats[{index}].wifi_box_id"), &self.wifi_box_id)?;
        require_topic_level(
            &format!("thermostats[{index}].thermostat_id"),
            &self.thermostat_id,
        )
    }
}

fn require_topic_level(name: &str, value: &str) -> Result<(), ConfigError> {
    require(name, value)?;
    if is_topic_level(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTopicLevel {
            field: name.to_string(),
            value: value.to_string(),
        })
    }
}

fn require(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField(name.to_string()))
    } else {
        Ok(())
    }
}

/// Configuration for automatic reconnection of the broker event loop.
///
/// In TOML, delays are given in milliseconds:
///
/// ```toml
/// [reconnection]
/// max_retries = 5
/// initial_delay_ms = 500
/// max_delay_ms = 30000
/// ```
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use besmart_bridge::config::ReconnectionPolicy;
///
/// let policy = ReconnectionPolicy::new()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(30));
///
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReconnectionPolicy {
    /// Whether automatic reconnection is enabled.
    pub enabled: bool,
    /// Maximum number of retries before giving up (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay between retry attempts.
    #[serde(rename = "initial_delay_ms", deserialize_with = "millis")]
    pub initial_delay: Duration,
    /// Maximum delay between retry attempts.
    #[serde(rename = "max_delay_ms", deserialize_with = "millis")]
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f32,
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

impl ReconnectionPolicy {
    /// Creates a new reconnection policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disabled reconnection policy.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets infinite retries.
    #[must_use]
    pub fn with_infinite_retries(mut self) -> Self {
        self.max_retries = None;
        self
    }

    /// Sets the initial delay between retry attempts.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retry attempts.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay before a given retry attempt.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = f64::from(self.backoff_multiplier).powi(exponent);
        let delay_secs = self.initial_delay.as_secs_f64() * factor;

        if !delay_secs.is_finite() || delay_secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(delay_secs.max(0.0))
    }

    /// Returns true if another retry should be attempted.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.enabled && self.max_retries.is_none_or(|max| attempt < max)
    }
}

impl Default for ReconnectionPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: Some(10),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}
