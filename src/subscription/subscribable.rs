// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for thermostats that notify a host binding.

use crate::state::{StateChange, ThermostatSnapshot};
use crate::subscription::SubscriptionId;
use crate::types::{HvacMode, PresetMode};

/// Trait for types that support state subscriptions.
///
/// Callbacks run after the thermostat's state lock has been released and
/// receive a consistent view. They must not block; a callback that needs
/// to do I/O should hand the work off to a task.
///
/// # Examples
///
/// ```
/// use besmart_bridge::subscription::Subscribable;
/// use besmart_bridge::thermostat::Thermostat;
/// use besmart_bridge::protocol::NullSink;
/// use besmart_bridge::types::ThermostatId;
///
/// let thermostat = Thermostat::new(ThermostatId::new("box", "t1"), NullSink);
///
/// let sub_id = thermostat.on_updated(|snapshot| {
///     println!("room is {:.1}", snapshot.room_temperature());
/// });
///
/// thermostat.unsubscribe(sub_id);
/// ```
pub trait Subscribable {
    /// Subscribes to every individual state change.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static;

    /// Subscribes to whole-snapshot refreshes.
    ///
    /// Called at most once per merge or intent, and only when something
    /// actually changed.
    fn on_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ThermostatSnapshot) + Send + Sync + 'static;

    /// Subscribes to preset changes.
    fn on_preset_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PresetMode) + Send + Sync + 'static;

    /// Subscribes to HVAC mode changes.
    fn on_hvac_mode_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(HvacMode) + Send + Sync + 'static;

    /// Subscribes to room temperature readings.
    fn on_room_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
