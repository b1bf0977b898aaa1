// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status message parsing for Besmart MQTT topics.
//!
//! The controller publishes partial status updates on
//! `besmart/<wifiBoxId>/<thermostatId>/status`. The payload is a JSON object
//! whose recognized keys are listed by [`StatusField`]; anything else is
//! ignored so newer firmware can add keys without breaking the bridge.
//!
//! # Examples
//!
//! ```
//! use besmart_bridge::telemetry::parse_status;
//!
//! let update = parse_status("besmart/box1/t1/status", r#"{"roomTemp":19.5,"mode":2}"#).unwrap();
//!
//! assert_eq!(update.id.thermostat_id(), "t1");
//! assert_eq!(update.message.room_temperature, Some(19.5));
//! ```

mod fields;
mod status_parser;

pub use fields::StatusField;
pub use status_parser::StatusMessage;

use crate::error::ParseError;
use crate::types::ThermostatId;

/// A status message together with the thermostat it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    /// Thermostat identity taken from the topic.
    pub id: ThermostatId,
    /// The parsed payload.
    pub message: StatusMessage,
}

/// Parses an MQTT topic and payload into a status update.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - The topic is not a `besmart/<box>/<thermostat>/status` topic
/// - The JSON payload is malformed
pub fn parse_status(topic: &str, payload: &str) -> Result<StatusUpdate, ParseError> {
    let id = ThermostatId::from_status_topic(topic).ok_or_else(|| ParseError::InvalidValue {
        field: "topic".to_string(),
        message: format!("not a status topic: {topic}"),
    })?;

    let message = StatusMessage::from_json(payload)?;

    Ok(StatusUpdate { id, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_topic_and_payload() {
        let update = parse_status("besmart/b/t/status", r#"{"heating":false}"#).unwrap();
        assert_eq!(update.id, ThermostatId::new("b", "t"));
        assert_eq!(update.message.heating, Some(false));
    }

    #[test]
    fn parse_status_rejects_foreign_topic() {
        let result = parse_status("besmart/command", r#"{"heating":false}"#);
        assert!(matches!(result, Err(ParseError::InvalidValue { .. })));
    }

    #[test]
    fn parse_status_rejects_bad_payload() {
        let result = parse_status("besmart/b/t/status", "not json");
        assert!(matches!(result, Err(ParseError::Json(_))));
    }
}
