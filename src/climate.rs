// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing climate capabilities.
//!
//! A home-automation host consumes a thermostat through two capabilities:
//! [`ClimateState`] for reading and [`ClimateControl`] for issuing intents.
//! Both are implemented by [`Thermostat`](crate::thermostat::Thermostat).

use serde::Serialize;

use crate::error::Result;
use crate::state::ThermostatSnapshot;
use crate::types::{HvacAction, HvacMode, PresetMode, TemperatureUnit};

/// Resolution of target temperature changes in the host UI.
pub const TARGET_TEMPERATURE_STEP: f64 = 0.2;

/// A control the host may offer for a climate entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClimateFeature {
    /// A single target temperature can be set.
    TargetTemperature,
    /// A preset can be selected.
    PresetMode,
}

impl ClimateFeature {
    /// Features every Besmart thermostat supports.
    pub const SUPPORTED: [Self; 2] = [Self::TargetTemperature, Self::PresetMode];

    /// Flag value of the feature in the host's feature bitmask.
    #[must_use]
    pub const fn flag(self) -> u32 {
        match self {
            Self::TargetTemperature => 1,
            Self::PresetMode => 16,
        }
    }

    /// Combines features into the host's bitmask.
    #[must_use]
    pub fn mask(features: &[Self]) -> u32 {
        features.iter().fold(0, |mask, feature| mask | feature.flag())
    }
}

/// Readable climate state.
pub trait ClimateState {
    /// Display name.
    fn name(&self) -> &str;

    /// Room label.
    fn room(&self) -> &str;

    /// The host never needs to poll: updates are pushed.
    fn should_poll(&self) -> bool {
        false
    }

    /// Controls the host should offer.
    fn supported_features(&self) -> &'static [ClimateFeature] {
        &ClimateFeature::SUPPORTED
    }

    /// Measured room temperature.
    fn current_temperature(&self) -> f64;

    /// Active target temperature.
    fn target_temperature(&self) -> f64;

    /// Upper target (comfort temperature).
    fn target_temperature_high(&self) -> f64;

    /// Lower target (economy temperature).
    fn target_temperature_low(&self) -> f64;

    /// Increment of the target temperature control.
    fn target_temperature_step(&self) -> f64 {
        TARGET_TEMPERATURE_STEP
    }

    /// Lowest settable temperature.
    fn min_temp(&self) -> f64;

    /// Highest settable temperature.
    fn max_temp(&self) -> f64;

    /// Unit of every temperature reported here.
    fn temperature_unit(&self) -> TemperatureUnit;

    /// Heating or cooling, from the season.
    fn hvac_mode(&self) -> HvacMode;

    /// Modes the host may select.
    fn hvac_modes(&self) -> &'static [HvacMode] {
        &HvacMode::ALL
    }

    /// What the device is doing right now.
    fn hvac_action(&self) -> HvacAction;

    /// Active preset; unknown work modes read as idle.
    fn preset_mode(&self) -> PresetMode;

    /// The six presets, in display order.
    fn preset_modes(&self) -> &'static [PresetMode] {
        &PresetMode::ALL
    }

    /// Device-specific attributes.
    fn extra_state_attributes(&self) -> StateAttributes;
}

/// Intents a host can issue.
#[allow(async_fn_in_trait)]
pub trait ClimateControl {
    /// Changes the HVAC mode.
    ///
    /// # Errors
    ///
    /// Returns error if the intent cannot be carried out.
    async fn set_hvac_mode(&self, mode: HvacMode) -> Result<()>;

    /// Changes the preset by name.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be delivered.
    async fn set_preset_mode(&self, preset: &str) -> Result<()>;

    /// Requests a new target temperature.
    ///
    /// # Errors
    ///
    /// Returns error if the value is not finite or the command cannot be
    /// delivered.
    async fn set_temperature(&self, temperature: f64) -> Result<()>;
}

/// Attribute bag exposed next to the standard climate state.
///
/// Serializes with the exact keys the host expects.
///
/// # Examples
///
/// ```
/// use besmart_bridge::climate::StateAttributes;
/// use besmart_bridge::state::ThermostatSnapshot;
/// use besmart_bridge::types::ThermostatId;
///
/// let snapshot = ThermostatSnapshot::new(ThermostatId::new("box", "t1"));
/// let json = serde_json::to_value(StateAttributes::from(&snapshot)).unwrap();
///
/// assert_eq!(json["season_mode"], "heat");
/// assert_eq!(json["maxSetPoint"], 60.0);
/// assert_eq!(json["battery_state"], "0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAttributes {
    /// Raw work-mode code.
    pub mode: i64,
    /// Battery state passthrough.
    pub battery_state: String,
    /// Anti-frost temperature.
    pub frost_t: f64,
    /// Comfort temperature.
    pub confort_t: f64,
    /// Economy temperature.
    pub save_t: f64,
    /// HVAC mode derived from the season.
    pub season_mode: HvacMode,
    /// Whether the heating element is active.
    pub heating: bool,
    /// Outside temperature.
    pub outside_temperature: f64,
    /// Highest setpoint.
    #[serde(rename = "maxSetPoint")]
    pub max_setpoint: f64,
    /// Lowest setpoint.
    #[serde(rename = "minSetPoint")]
    pub min_setpoint: f64,
}

impl From<&ThermostatSnapshot> for StateAttributes {
    fn from(snapshot: &ThermostatSnapshot) -> Self {
        Self {
            mode: snapshot.work_mode_code(),
            battery_state: snapshot.battery_state().to_string(),
            frost_t: snapshot.anti_frost_temperature(),
            confort_t: snapshot.comfort_temperature(),
            save_t: snapshot.economy_temperature(),
            season_mode: snapshot.hvac_mode(),
            heating: snapshot.heating(),
            outside_temperature: snapshot.outside_temperature(),
            max_setpoint: snapshot.max_setpoint(),
            min_setpoint: snapshot.min_setpoint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateChange;
    use crate::types::{Season, ThermostatId};

    #[test]
    fn attributes_use_host_keys() {
        let mut snapshot = ThermostatSnapshot::new(ThermostatId::new("b", "t"));
        for change in [
            StateChange::WorkMode(99),
            StateChange::AntiFrostTemperature(5.0),
            StateChange::ComfortTemperature(21.0),
            StateChange::EconomyTemperature(17.0),
            StateChange::Season(Season::Cool),
            StateChange::Heating(true),
            StateChange::OutsideTemperature(-2.5),
            StateChange::MinSetpoint(5.0),
        ] {
            snapshot.apply(&change);
        }

        let json = serde_json::to_value(StateAttributes::from(&snapshot)).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "battery_state",
                "confort_t",
                "frost_t",
                "heating",
                "maxSetPoint",
                "minSetPoint",
                "mode",
                "outside_temperature",
                "save_t",
                "season_mode",
            ]
        );

        assert_eq!(json["mode"], 99);
        assert_eq!(json["frost_t"], 5.0);
        assert_eq!(json["confort_t"], 21.0);
        assert_eq!(json["save_t"], 17.0);
        assert_eq!(json["season_mode"], "cool");
        assert_eq!(json["heating"], true);
        assert_eq!(json["outside_temperature"], -2.5);
        assert_eq!(json["minSetPoint"], 5.0);
        assert_eq!(json["maxSetPoint"], 60.0);
    }

    #[test]
    fn supported_features_mask() {
        assert_eq!(ClimateFeature::mask(&ClimateFeature::SUPPORTED), 17);
        assert_eq!(ClimateFeature::mask(&[]), 0);
        assert_eq!(ClimateFeature::PresetMode.flag(), 16);
    }
}
