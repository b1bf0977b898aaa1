// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known state of one thermostat.

use serde_json::Value;

use crate::types::{
    HvacAction, HvacMode, PresetMode, Season, TemperatureUnit, ThermostatId, WorkMode,
};

use super::StateChange;

/// Default lower setpoint bound until the controller reports one.
pub const DEFAULT_MIN_SETPOINT: f64 = 45.0;

/// Default upper setpoint bound until the controller reports one.
pub const DEFAULT_MAX_SETPOINT: f64 = 60.0;

/// Default battery state passthrough.
pub const DEFAULT_BATTERY_STATE: &str = "0";

/// Full state of one physical thermostat, rebuilt from partial updates.
///
/// Every field holds a value from construction on; fields absent from an
/// update keep their previous value. The identity is fixed for the lifetime
/// of the snapshot.
///
/// The work mode is stored as the raw code the controller sent so that an
/// unknown code is kept for diagnostics; [`preset_mode`](Self::preset_mode)
/// reads such a code as [`PresetMode::Idle`].
///
/// # Examples
///
/// ```
/// use besmart_bridge::state::{StateChange, ThermostatSnapshot};
/// use besmart_bridge::types::{PresetMode, ThermostatId};
///
/// let mut snapshot = ThermostatSnapshot::new(ThermostatId::new("box", "t1"));
/// assert_eq!(snapshot.preset_mode(), PresetMode::Idle);
///
/// snapshot.apply(&StateChange::WorkMode(3));
/// assert_eq!(snapshot.preset_mode(), PresetMode::Party);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatSnapshot {
    id: ThermostatId,
    room_temperature: f64,
    outside_temperature: f64,
    anti_frost_temperature: f64,
    economy_temperature: f64,
    comfort_temperature: f64,
    min_setpoint: f64,
    max_setpoint: f64,
    current_setpoint: f64,
    climatic_curve: f64,
    current_heating_setpoint: f64,
    heating: bool,
    work_mode: i64,
    season: Season,
    temperature_unit: TemperatureUnit,
    battery_state: String,
    wifi_signal: Option<Value>,
}

impl ThermostatSnapshot {
    /// Creates a snapshot with the documented defaults.
    #[must_use]
    pub fn new(id: ThermostatId) -> Self {
        Self {
            id,
            room_temperature: 0.0,
            outside_temperature: 0.0,
            anti_frost_temperature: 0.0,
            economy_temperature: 0.0,
            comfort_temperature: 0.0,
            min_setpoint: DEFAULT_MIN_SETPOINT,
            max_setpoint: DEFAULT_MAX_SETPOINT,
            current_setpoint: 0.0,
            climatic_curve: 0.0,
            current_heating_setpoint: 0.0,
            heating: false,
            work_mode: i64::from(WorkMode::Idle.code()),
            season: Season::Heat,
            temperature_unit: TemperatureUnit::Celsius,
            battery_state: DEFAULT_BATTERY_STATE.to_string(),
            wifi_signal: None,
        }
    }

    /// Returns the thermostat identity.
    #[must_use]
    pub fn id(&self) -> &ThermostatId {
        &self.id
    }

    // ========== Temperatures ==========

    /// Last measured room temperature.
    #[must_use]
    pub fn room_temperature(&self) -> f64 {
        self.room_temperature
    }

    /// Outside temperature.
    #[must_use]
    pub fn outside_temperature(&self) -> f64 {
        self.outside_temperature
    }

    /// Anti-frost preset temperature.
    #[must_use]
    pub fn anti_frost_temperature(&self) -> f64 {
        self.anti_frost_temperature
    }

    /// Economy preset temperature.
    #[must_use]
    pub fn economy_temperature(&self) -> f64 {
        self.economy_temperature
    }

    /// Comfort preset temperature.
    #[must_use]
    pub fn comfort_temperature(&self) -> f64 {
        self.comfort_temperature
    }

    /// Lower setpoint bound enforced by the controller.
    #[must_use]
    pub fn min_setpoint(&self) -> f64 {
        self.min_setpoint
    }

    /// Upper setpoint bound enforced by the controller.
    #[must_use]
    pub fn max_setpoint(&self) -> f64 {
        self.max_setpoint
    }

    /// Active target temperature.
    #[must_use]
    pub fn current_setpoint(&self) -> f64 {
        self.current_setpoint
    }

    /// Boiler climatic curve.
    #[must_use]
    pub fn climatic_curve(&self) -> f64 {
        self.climatic_curve
    }

    /// Boiler flow setpoint.
    #[must_use]
    pub fn current_heating_setpoint(&self) -> f64 {
        self.current_heating_setpoint
    }

    /// Target temperature shown to the host (the active setpoint).
    #[must_use]
    pub fn target_temperature(&self) -> f64 {
        self.current_setpoint
    }

    /// Upper target shown to the host (the comfort temperature).
    #[must_use]
    pub fn target_temperature_high(&self) -> f64 {
        self.comfort_temperature
    }

    /// Lower target shown to the host (the economy temperature).
    #[must_use]
    pub fn target_temperature_low(&self) -> f64 {
        self.economy_temperature
    }

    /// Unit of every temperature in this snapshot.
    #[must_use]
    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.temperature_unit
    }

    // ========== Modes ==========

    /// Whether the heating element is active.
    #[must_use]
    pub fn heating(&self) -> bool {
        self.heating
    }

    /// Raw work-mode code, possibly outside the known range.
    #[must_use]
    pub fn work_mode_code(&self) -> i64 {
        self.work_mode
    }

    /// Work mode, or `None` if the controller sent an unknown code.
    #[must_use]
    pub fn work_mode(&self) -> Option<WorkMode> {
        WorkMode::from_code(self.work_mode)
    }

    /// Preset shown to the host; unknown codes read as [`PresetMode::Idle`].
    #[must_use]
    pub fn preset_mode(&self) -> PresetMode {
        PresetMode::from_code_or_idle(self.work_mode)
    }

    /// Heating or cooling season.
    #[must_use]
    pub fn season(&self) -> Season {
        self.season
    }

    /// HVAC mode shown to the host.
    #[must_use]
    pub fn hvac_mode(&self) -> HvacMode {
        HvacMode::from(self.season)
    }

    /// Current HVAC action derived from the heating flag and the mode.
    #[must_use]
    pub fn hvac_action(&self) -> HvacAction {
        HvacAction::derive(self.heating, self.hvac_mode())
    }

    // ========== Passthrough ==========

    /// Battery state as an opaque string.
    #[must_use]
    pub fn battery_state(&self) -> &str {
        &self.battery_state
    }

    /// Wi-Fi signal of the box, if reported.
    #[must_use]
    pub fn wifi_signal(&self) -> Option<&Value> {
        self.wifi_signal.as_ref()
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the snapshot actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        // Helper macro to overwrite a field and report whether it differed
        macro_rules! update {
            ($field:ident, $value:expr) => {{
                let value = $value;
                if self.$field == value {
                    false
                } else {
                    self.$field = value;
                    true
                }
            }};
        }

        match change {
            StateChange::RoomTemperature(v) => update!(room_temperature, *v),
            StateChange::OutsideTemperature(v) => update!(outside_temperature, *v),
            StateChange::AntiFrostTemperature(v) => update!(anti_frost_temperature, *v),
            StateChange::EconomyTemperature(v) => update!(economy_temperature, *v),
            StateChange::ComfortTemperature(v) => update!(comfort_temperature, *v),
            StateChange::MinSetpoint(v) => update!(min_setpoint, *v),
            StateChange::MaxSetpoint(v) => update!(max_setpoint, *v),
            StateChange::CurrentSetpoint(v) => update!(current_setpoint, *v),
            StateChange::ClimaticCurve(v) => update!(climatic_curve, *v),
            StateChange::CurrentHeatingSetpoint(v) => update!(current_heating_setpoint, *v),
            StateChange::Heating(v) => update!(heating, *v),
            StateChange::WorkMode(code) => update!(work_mode, *code),
            StateChange::Season(season) => update!(season, *season),
            StateChange::WifiSignal(signal) => update!(wifi_signal, Some(signal.clone())),
        }
    }
}
