// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the unit of mutation for a
//! [`ThermostatSnapshot`](super::ThermostatSnapshot). Inbound status messages
//! decompose into one change per present field, and host intents that update
//! local state optimistically produce a single change.
//!
//! # Examples
//!
//! ```
//! use besmart_bridge::state::{StateChange, ThermostatSnapshot};
//! use besmart_bridge::types::{Season, ThermostatId};
//!
//! let mut snapshot = ThermostatSnapshot::new(ThermostatId::new("box", "t1"));
//!
//! // Apply returns true if the snapshot actually changed
//! assert!(snapshot.apply(&StateChange::RoomTemperature(21.5)));
//! assert!(!snapshot.apply(&StateChange::RoomTemperature(21.5)));
//!
//! // Season is already heat by default
//! assert!(!snapshot.apply(&StateChange::Season(Season::Heat)));
//! ```

use serde_json::Value;

use crate::telemetry::StatusField;
use crate::types::Season;

/// A change to one field of a thermostat snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Measured room temperature.
    RoomTemperature(f64),
    /// Outside temperature.
    OutsideTemperature(f64),
    /// Anti-frost preset temperature.
    AntiFrostTemperature(f64),
    /// Economy preset temperature.
    EconomyTemperature(f64),
    /// Comfort preset temperature.
    ComfortTemperature(f64),
    /// Lower setpoint bound.
    MinSetpoint(f64),
    /// Upper setpoint bound.
    MaxSetpoint(f64),
    /// Active target temperature.
    CurrentSetpoint(f64),
    /// Boiler climatic curve.
    ClimaticCurve(f64),
    /// Boiler flow setpoint.
    CurrentHeatingSetpoint(f64),
    /// Heating element activity.
    Heating(bool),
    /// Raw work-mode code as reported by the controller.
    WorkMode(i64),
    /// Heating or cooling season.
    Season(Season),
    /// Opaque Wi-Fi signal value.
    WifiSignal(Value),
}

impl StateChange {
    /// Returns the status field this change writes.
    #[must_use]
    pub fn field(&self) -> StatusField {
        match self {
            Self::RoomTemperature(_) => StatusField::RoomTemperature,
            Self::OutsideTemperature(_) => StatusField::OutsideTemperature,
            Self::AntiFrostTemperature(_) => StatusField::AntiFrostTemperature,
            Self::EconomyTemperature(_) => StatusField::EconomyTemperature,
            Self::ComfortTemperature(_) => StatusField::ComfortTemperature,
            Self::MinSetpoint(_) => StatusField::MinSetpoint,
            Self::MaxSetpoint(_) => StatusField::MaxSetpoint,
            Self::CurrentSetpoint(_) => StatusField::CurrentSetpoint,
            Self::ClimaticCurve(_) => StatusField::ClimaticCurve,
            Self::CurrentHeatingSetpoint(_) => StatusField::CurrentHeatingSetpoint,
            Self::Heating(_) => StatusField::Heating,
            Self::WorkMode(_) => StatusField::WorkMode,
            Self::Season(_) => StatusField::Season,
            Self::WifiSignal(_) => StatusField::WifiSignal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_mapping() {
        assert_eq!(
            StateChange::CurrentHeatingSetpoint(50.0).field(),
            StatusField::CurrentHeatingSetpoint
        );
        assert_eq!(StateChange::WorkMode(3).field(), StatusField::WorkMode);
        assert_eq!(StateChange::Season(Season::Cool).field(), StatusField::Season);
    }
}
