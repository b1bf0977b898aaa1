// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Besmart command definitions.
//!
//! Commands are published as JSON on the single [`COMMAND_TOPIC`], shared by
//! every thermostat. Each payload names the command, carries its value and
//! the identity pair the broker uses to route it to the right device.
//!
//! # Available Commands
//!
//! | Command Type | Wire name | Value |
//! |-------------|-----------|-------|
//! | [`SetModeCommand`] | `setMode` | integer work-mode code |
//! | [`SetComfortTemperatureCommand`] | `setComfortTemperature` | temperature |
//!
//! # Examples
//!
//! ```
//! use besmart_bridge::command::{Command, SetModeCommand};
//! use besmart_bridge::types::{ThermostatId, WorkMode};
//!
//! let id = ThermostatId::new("box", "t1");
//! let payload = SetModeCommand::new(WorkMode::Party).to_payload(&id);
//!
//! assert_eq!(
//!     payload.to_json().unwrap(),
//!     r#"{"command":"setMode","value":3,"wifiBoxId":"box","thermostatId":"t1"}"#
//! );
//! ```

mod mode;
mod temperature;

pub use mode::SetModeCommand;
pub use temperature::SetComfortTemperatureCommand;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;
use crate::types::ThermostatId;

/// Topic every command is published on.
pub const COMMAND_TOPIC: &str = "besmart/command";

/// A command that can be sent to a Besmart thermostat.
pub trait Command {
    /// Returns the wire name of the command.
    fn name(&self) -> &'static str;

    /// Returns the command value.
    fn value(&self) -> Value;

    /// Builds the routed payload for a thermostat.
    fn to_payload(&self, id: &ThermostatId) -> CommandPayload {
        CommandPayload {
            command: self.name().to_string(),
            value: self.value(),
            wifi_box_id: id.wifi_box_id().to_string(),
            thermostat_id: id.thermostat_id().to_string(),
        }
    }
}

/// JSON body published on [`COMMAND_TOPIC`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    /// Command name.
    pub command: String,
    /// Command value.
    pub value: Value,
    /// Target Wi-Fi box.
    #[serde(rename = "wifiBoxId")]
    pub wifi_box_id: String,
    /// Target thermostat on that box.
    #[serde(rename = "thermostatId")]
    pub thermostat_id: String,
}

impl CommandPayload {
    /// Returns the identity this payload is routed to.
    #[must_use]
    pub fn target(&self) -> ThermostatId {
        ThermostatId::new(&self.wifi_box_id, &self.thermostat_id)
    }

    /// Returns the topic this payload is published on.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        COMMAND_TOPIC
    }

    /// Serializes the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string(self).map_err(ParseError::Json)
    }
}
