// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the state engine and the host surface.
//!
//! # Types
//!
//! - [`WorkMode`] - Controller operating mode (wire codes 0-5)
//! - [`PresetMode`] - Host preset names, one per work mode
//! - [`Season`] - Heating/cooling season (`"1"` / `"0"` on the wire)
//! - [`HvacMode`] - Host HVAC mode derived from the season
//! - [`HvacAction`] - Heating element activity
//! - [`TemperatureUnit`] - Celsius or Fahrenheit
//! - [`ThermostatId`] - Wi-Fi box id and thermostat id pair

mod season;
mod temperature_unit;
mod thermostat_id;
mod work_mode;

pub use season::{HvacAction, HvacMode, Season};
pub use temperature_unit::TemperatureUnit;
pub use thermostat_id::{TOPIC_PREFIX, ThermostatId, is_topic_level};
pub use work_mode::{PresetMode, WorkMode};
