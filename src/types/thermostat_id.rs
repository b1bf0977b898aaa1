// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Physical thermostat identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every Besmart topic.
pub const TOPIC_PREFIX: &str = "besmart";

/// Compound key of a physical thermostat: the Wi-Fi box it is paired with
/// and its id on that box.
///
/// # Examples
///
/// ```
/// use besmart_bridge::types::ThermostatId;
///
/// let id = ThermostatId::new("box1", "t7");
/// assert_eq!(id.status_topic(), "besmart/box1/t7/status");
/// assert_eq!(ThermostatId::from_status_topic("besmart/box1/t7/status"), Some(id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThermostatId {
    #[serde(rename = "wifiBoxId")]
    wifi_box_id: String,
    #[serde(rename = "thermostatId")]
    thermostat_id: String,
}

impl ThermostatId {
    /// Creates an identity from its two parts.
    #[must_use]
    pub fn new(wifi_box_id: impl Into<String>, thermostat_id: impl Into<String>) -> Self {
        Self {
            wifi_box_id: wifi_box_id.into(),
            thermostat_id: thermostat_id.into(),
        }
    }

    /// Returns the Wi-Fi box id.
    #[must_use]
    pub fn wifi_box_id(&self) -> &str {
        &self.wifi_box_id
    }

    /// Returns the thermostat id.
    #[must_use]
    pub fn thermostat_id(&self) -> &str {
        &self.thermostat_id
    }

    /// Returns `true` if both parts can be used as a single topic level.
    ///
    /// A part must be non-empty and free of `/`, `+` and `#`; otherwise the
    /// status subscription would cover other topics than the one routed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_topic_level(&self.wifi_box_id) && is_topic_level(&self.thermostat_id)
    }

    /// Returns the topic the controller publishes status updates on.
    #[must_use]
    pub fn status_topic(&self) -> String {
        format!(
            "{TOPIC_PREFIX}/{}/{}/status",
            self.wifi_box_id, self.thermostat_id
        )
    }

    /// Parses a `besmart/<box>/<thermostat>/status` topic.
    #[must_use]
    pub fn from_status_topic(topic: &str) -> Option<Self> {
        let mut parts = topic.split('/');
        let (Some(TOPIC_PREFIX), Some(wifi_box_id), Some(thermostat_id), Some("status"), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return None;
        };

        if wifi_box_id.is_empty() || thermostat_id.is_empty() {
            return None;
        }

        Some(Self::new(wifi_box_id, thermostat_id))
    }
}

/// Returns `true` if `part` fits in one literal MQTT topic level.
#[must_use]
pub fn is_topic_level(part: &str) -> bool {
    !part.is_empty() && !part.contains(['/', '+', '#'])
}

impl fmt::Display for ThermostatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.wifi_box_id, self.thermostat_id)
    }
}
