// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field names of the controller status payload.

use std::fmt;

/// A recognized key of the `besmart/<box>/<thermostat>/status` payload.
///
/// The wire names are a fixed contract with the controller firmware. Any
/// other key in a status payload is ignored.
///
/// # Examples
///
/// ```
/// use besmart_bridge::telemetry::StatusField;
///
/// assert_eq!(StatusField::RoomTemperature.wire_name(), "roomTemp");
/// assert_eq!(StatusField::from_wire_name("outSideTemp"), Some(StatusField::OutsideTemperature));
/// assert_eq!(StatusField::from_wire_name("firmware"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    /// `roomTemp`
    RoomTemperature,
    /// `antiFrostTemperature`
    AntiFrostTemperature,
    /// `economyTemperature`
    EconomyTemperature,
    /// `comfortTemperature`
    ComfortTemperature,
    /// `minSetPoint`
    MinSetpoint,
    /// `maxSetPoint`
    MaxSetpoint,
    /// `currentSetPoint`
    CurrentSetpoint,
    /// `climaticCurve`
    ClimaticCurve,
    /// `heatingSetPoint`
    CurrentHeatingSetpoint,
    /// `heating`
    Heating,
    /// `mode`
    WorkMode,
    /// `outSideTemp`
    OutsideTemperature,
    /// `wifiSignal`
    WifiSignal,
    /// `season`
    Season,
}

impl StatusField {
    /// Every recognized field.
    pub const ALL: [Self; 14] = [
        Self::RoomTemperature,
        Self::AntiFrostTemperature,
        Self::EconomyTemperature,
        Self::ComfortTemperature,
        Self::MinSetpoint,
        Self::MaxSetpoint,
        Self::CurrentSetpoint,
        Self::ClimaticCurve,
        Self::CurrentHeatingSetpoint,
        Self::Heating,
        Self::WorkMode,
        Self::OutsideTemperature,
        Self::WifiSignal,
        Self::Season,
    ];

    /// Returns the JSON key used by the controller.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::RoomTemperature => "roomTemp",
            Self::AntiFrostTemperature => "antiFrostTemperature",
            Self::EconomyTemperature => "economyTemperature",
            Self::ComfortTemperature => "comfortTemperature",
            Self::MinSetpoint => "minSetPoint",
            Self::MaxSetpoint => "maxSetPoint",
            Self::CurrentSetpoint => "currentSetPoint",
            Self::ClimaticCurve => "climaticCurve",
            Self::CurrentHeatingSetpoint => "heatingSetPoint",
            Self::Heating => "heating",
            Self::WorkMode => "mode",
            Self::OutsideTemperature => "outSideTemp",
            Self::WifiSignal => "wifiSignal",
            Self::Season => "season",
        }
    }

    /// Looks a field up by its JSON key.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.wire_name() == name)
    }
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
