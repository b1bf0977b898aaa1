// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for controller status messages.
//!
//! Keys are looked up through [`StatusField`], so the field table there is
//! the only place a wire name is spelled out. Decoding, serialization and
//! the conversion into state changes all walk [`StatusField::ALL`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::state::StateChange;
use crate::telemetry::StatusField;
use crate::types::Season;

/// Parsed `besmart/<box>/<thermostat>/status` payload.
///
/// Every field is optional: the controller sends partial updates. Keys that
/// are not part of the status contract are ignored. A recognized key with a
/// value of the wrong JSON type rejects the whole message.
///
/// # Examples
///
/// ```
/// use besmart_bridge::telemetry::StatusMessage;
///
/// let msg = StatusMessage::from_json(r#"{"roomTemp":21.5,"heating":true,"firmware":"2.1"}"#).unwrap();
///
/// assert_eq!(msg.room_temperature, Some(21.5));
/// assert_eq!(msg.heating, Some(true));
/// assert_eq!(msg.to_state_changes().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusMessage {
    /// Measured room temperature.
    pub room_temperature: Option<f64>,
    /// Anti-frost preset temperature.
    pub anti_frost_temperature: Option<f64>,
    /// Economy preset temperature.
    pub economy_temperature: Option<f64>,
    /// Comfort preset temperature.
    pub comfort_temperature: Option<f64>,
    /// Lowest setpoint the controller accepts.
    pub min_setpoint: Option<f64>,
    /// Highest setpoint the controller accepts.
    pub max_setpoint: Option<f64>,
    /// Active target temperature.
    pub current_setpoint: Option<f64>,
    /// Climatic curve of the boiler.
    pub climatic_curve: Option<f64>,
    /// Flow temperature the boiler is heating to.
    pub current_heating_setpoint: Option<f64>,
    /// Whether the heating element is active.
    pub heating: Option<bool>,
    /// Raw work-mode code (0-5 for known firmware).
    pub mode: Option<i64>,
    /// Outside temperature from the boiler probe.
    pub outside_temperature: Option<f64>,
    /// Wi-Fi signal of the box, passed through untouched.
    pub wifi_signal: Option<Value>,
    /// Season as `"1"` (heat) or `"0"` (cool); numbers are accepted too.
    pub season: Option<Value>,
}

/// Decodes one field value; JSON `null` reads as absent.
fn decode<T: DeserializeOwned>(value: Value) -> Result<Option<T>, ParseError> {
    serde_json::from_value(value).map_err(ParseError::Json)
}

impl StatusMessage {
    /// Parses a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if the payload is not a JSON object or a
    /// recognized field has the wrong type.
    pub fn from_json(payload: &str) -> Result<Self, ParseError> {
        let fields: Map<String, Value> =
            serde_json::from_str(payload).map_err(ParseError::Json)?;
        Self::from_map(fields)
    }

    /// Builds a message from an already decoded field map.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if a recognized field has the wrong type.
    pub fn from_map(mut fields: Map<String, Value>) -> Result<Self, ParseError> {
        let mut message = Self::default();
        for field in StatusField::ALL {
            if let Some(value) = fields.remove(field.wire_name()) {
                message.set(field, value)?;
            }
        }
        Ok(message)
    }

    fn set(&mut self, field: StatusField, value: Value) -> Result<(), ParseError> {
        match field {
            StatusField::Heating => self.heating = decode(value)?,
            StatusField::WorkMode => self.mode = decode(value)?,
            StatusField::WifiSignal => self.wifi_signal = decode(value)?,
            StatusField::Season => self.season = decode(value)?,
            _ => {
                if let Some(slot) = self.temperature_mut(field) {
                    *slot = decode(value)?;
                }
            }
        }
        Ok(())
    }

    fn temperature_mut(&mut self, field: StatusField) -> Option<&mut Option<f64>> {
        let slot = match field {
            StatusField::RoomTemperature => &mut self.room_temperature,
            StatusField::AntiFrostTemperature => &mut self.anti_frost_temperature,
            StatusField::EconomyTemperature => &mut self.economy_temperature,
            StatusField::ComfortTemperature => &mut self.comfort_temperature,
            StatusField::MinSetpoint => &mut self.min_setpoint,
            StatusField::MaxSetpoint => &mut self.max_setpoint,
            StatusField::CurrentSetpoint => &mut self.current_setpoint,
            StatusField::ClimaticCurve => &mut self.climatic_curve,
            StatusField::CurrentHeatingSetpoint => &mut self.current_heating_setpoint,
            StatusField::OutsideTemperature => &mut self.outside_temperature,
            StatusField::Heating
            | StatusField::WorkMode
            | StatusField::WifiSignal
            | StatusField::Season => return None,
        };
        Some(slot)
    }

    /// Returns the raw value of a field, if present.
    #[must_use]
    pub fn get(&self, field: StatusField) -> Option<Value> {
        match field {
            StatusField::RoomTemperature => self.room_temperature.map(Value::from),
            StatusField::AntiFrostTemperature => self.anti_frost_temperature.map(Value::from),
            StatusField::EconomyTemperature => self.economy_temperature.map(Value::from),
            StatusField::ComfortTemperature => self.comfort_temperature.map(Value::from),
            StatusField::MinSetpoint => self.min_setpoint.map(Value::from),
            StatusField::MaxSetpoint => self.max_setpoint.map(Value::from),
            StatusField::CurrentSetpoint => self.current_setpoint.map(Value::from),
            StatusField::ClimaticCurve => self.climatic_curve.map(Value::from),
            StatusField::CurrentHeatingSetpoint => {
                self.current_heating_setpoint.map(Value::from)
            }
            StatusField::Heating => self.heating.map(Value::Bool),
            StatusField::WorkMode => self.mode.map(Value::from),
            StatusField::OutsideTemperature => self.outside_temperature.map(Value::from),
            StatusField::WifiSignal => self.wifi_signal.clone(),
            StatusField::Season => self.season.clone(),
        }
    }

    /// Returns the present fields keyed by their wire names.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        StatusField::ALL
            .into_iter()
            .filter_map(|field| Some((field.wire_name().to_string(), self.get(field)?)))
            .collect()
    }

    /// Returns `true` if no recognized field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        StatusField::ALL
            .into_iter()
            .all(|field| self.get(field).is_none())
    }

    /// Decodes the season field, if present.
    ///
    /// Values other than `"1"` / `"0"` (or `1` / `0`) fall back to
    /// [`Season::Heat`].
    #[must_use]
    pub fn season(&self) -> Option<Season> {
        let raw = self.season.as_ref()?;
        let decoded = match raw {
            Value::String(s) => Season::from_wire(s),
            Value::Number(n) => n.as_i64().and_then(|code| match code {
                1 => Some(Season::Heat),
                0 => Some(Season::Cool),
                _ => None,
            }),
            _ => None,
        };

        Some(decoded.unwrap_or_else(|| {
            tracing::warn!(season = %raw, "Unknown season value, assuming heat");
            Season::Heat
        }))
    }

    /// Returns the state change a present field produces.
    #[must_use]
    pub fn change(&self, field: StatusField) -> Option<StateChange> {
        match field {
            StatusField::RoomTemperature => self.room_temperature.map(StateChange::RoomTemperature),
            StatusField::AntiFrostTemperature => self
                .anti_frost_temperature
                .map(StateChange::AntiFrostTemperature),
            StatusField::EconomyTemperature => {
                self.economy_temperature.map(StateChange::EconomyTemperature)
            }
            StatusField::ComfortTemperature => {
                self.comfort_temperature.map(StateChange::ComfortTemperature)
            }
            StatusField::MinSetpoint => self.min_setpoint.map(StateChange::MinSetpoint),
            StatusField::MaxSetpoint => self.max_setpoint.map(StateChange::MaxSetpoint),
            StatusField::CurrentSetpoint => self.current_setpoint.map(StateChange::CurrentSetpoint),
            StatusField::ClimaticCurve => self.climatic_curve.map(StateChange::ClimaticCurve),
            StatusField::CurrentHeatingSetpoint => self
                .current_heating_setpoint
                .map(StateChange::CurrentHeatingSetpoint),
            StatusField::Heating => self.heating.map(StateChange::Heating),
            StatusField::WorkMode => self.mode.map(StateChange::WorkMode),
            StatusField::OutsideTemperature => {
                self.outside_temperature.map(StateChange::OutsideTemperature)
            }
            StatusField::WifiSignal => self.wifi_signal.clone().map(StateChange::WifiSignal),
            StatusField::Season => self.season().map(StateChange::Season),
        }
    }

    /// Converts the message into one state change per present field.
    #[must_use]
    pub fn to_state_changes(&self) -> Vec<StateChange> {
        StatusField::ALL
            .into_iter()
            .filter_map(|field| self.change(field))
            .collect()
    }
}

impl Serialize for StatusMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatusMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(fields).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Map<String, Value>> for StatusMessage {
    type Error = ParseError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_map(fields)
    }
}
