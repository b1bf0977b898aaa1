// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat state tracking.
//!
//! [`ThermostatSnapshot`] holds the last-known state of one thermostat and
//! [`StateChange`] represents a single field update. Inbound status messages
//! are merged field by field: a field missing from an update keeps its
//! previous value.
//!
//! # Examples
//!
//! ```
//! use besmart_bridge::state::{StateChange, ThermostatSnapshot};
//! use besmart_bridge::types::ThermostatId;
//!
//! let mut state = ThermostatSnapshot::new(ThermostatId::new("box", "t1"));
//!
//! state.apply(&StateChange::CurrentSetpoint(20.0));
//! state.apply(&StateChange::RoomTemperature(19.5));
//!
//! assert_eq!(state.target_temperature(), 20.0);
//! assert_eq!(state.room_temperature(), 19.5);
//! ```

mod state_change;
mod thermostat_snapshot;

pub use state_change::StateChange;
pub use thermostat_snapshot::{
    DEFAULT_BATTERY_STATE, DEFAULT_MAX_SETPOINT, DEFAULT_MIN_SETPOINT, ThermostatSnapshot,
};
