// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! The hierarchy mirrors the layers of the bridge: value validation for host
//! intents, transport failures, status payload parsing and configuration
//! loading.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A host intent carried an unusable value.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Publishing or connecting through the transport failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An inbound status payload could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The bridge configuration is invalid or could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised when converting host-facing values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A temperature was NaN or infinite.
    #[error("temperature {0} is not a finite number")]
    NotFinite(f64),

    /// A preset name is not one of the six known presets.
    #[error("unknown preset mode: {0}")]
    UnknownPreset(String),

    /// An HVAC mode name is neither `heat` nor `cool`.
    #[error("unknown hvac mode: {0}")]
    UnknownHvacMode(String),

    /// A device work-mode code is outside 0-5.
    #[error("unknown work mode code: {0}")]
    UnknownWorkMode(i64),
}

/// Errors related to the MQTT transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client rejected a request.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing status payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload is not valid JSON or a recognized field has the wrong type.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field parsed but holds an unusable value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to loading the bridge configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required setting is missing or empty.
    #[error("missing required setting: {0}")]
    MissingField(String),

    /// The broker port is zero.
    #[error("invalid broker port: {0}")]
    InvalidPort(u16),

    /// An id contains a character that is not allowed in a topic level.
    #[error("invalid {field}: {value:?} must not contain '/', '+' or '#'")]
    InvalidTopicLevel {
        /// Setting name.
        field: String,
        /// Offending value.
        value: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
