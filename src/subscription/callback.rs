// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for thermostat state subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::{StateChange, ThermostatSnapshot};
use crate::types::{HvacMode, PresetMode};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to unsubscribe later.
/// IDs are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type StateChangedCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;
type UpdatedCallback = Arc<dyn Fn(&ThermostatSnapshot) + Send + Sync>;
type PresetCallback = Arc<dyn Fn(PresetMode) + Send + Sync>;
type HvacModeCallback = Arc<dyn Fn(HvacMode) + Send + Sync>;
type TemperatureCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Registry for thermostat subscription callbacks.
///
/// Dispatch clones the callback list out of the lock before invoking it, so
/// a callback may register or unsubscribe other callbacks without
/// deadlocking.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    state_changed_callbacks: RwLock<HashMap<SubscriptionId, StateChangedCallback>>,
    /// Called once per merge or intent with the resulting snapshot.
    updated_callbacks: RwLock<HashMap<SubscriptionId, UpdatedCallback>>,
    preset_callbacks: RwLock<HashMap<SubscriptionId, PresetCallback>>,
    hvac_mode_callbacks: RwLock<HashMap<SubscriptionId, HvacModeCallback>>,
    room_temperature_callbacks: RwLock<HashMap<SubscriptionId, TemperatureCallback>>,
}

fn snapshot_of<T: Clone>(map: &RwLock<HashMap<SubscriptionId, T>>) -> Vec<T> {
    map.read().values().cloned().collect()
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            state_changed_callbacks: RwLock::new(HashMap::new()),
            updated_callbacks: RwLock::new(HashMap::new()),
            preset_callbacks: RwLock::new(HashMap::new()),
            hvac_mode_callbacks: RwLock::new(HashMap::new()),
            room_temperature_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for every individual state change.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback receiving the snapshot after each update.
    pub fn on_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ThermostatSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.updated_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for preset changes.
    ///
    /// Work-mode codes outside the known range are reported as
    /// [`PresetMode::Idle`].
    pub fn on_preset_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PresetMode) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.preset_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for HVAC mode (season) changes.
    pub fn on_hvac_mode_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(HvacMode) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.hvac_mode_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for room temperature readings.
    pub fn on_room_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.room_temperature_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state_changed_callbacks.write().remove(&id).is_some()
            || self.updated_callbacks.write().remove(&id).is_some()
            || self.preset_callbacks.write().remove(&id).is_some()
            || self.hvac_mode_callbacks.write().remove(&id).is_some()
            || self.room_temperature_callbacks.write().remove(&id).is_some()
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches a state change to matching callbacks.
    pub fn dispatch(&self, change: &StateChange) {
        for callback in snapshot_of(&self.state_changed_callbacks) {
            callback(change);
        }

        match change {
            StateChange::WorkMode(code) => {
                let preset = PresetMode::from_code_or_idle(*code);
                for callback in snapshot_of(&self.preset_callbacks) {
                    callback(preset);
                }
            }
            StateChange::Season(season) => {
                let mode = HvacMode::from(*season);
                for callback in snapshot_of(&self.hvac_mode_callbacks) {
                    callback(mode);
                }
            }
            StateChange::RoomTemperature(value) => {
                for callback in snapshot_of(&self.room_temperature_callbacks) {
                    callback(*value);
                }
            }
            _ => {}
        }
    }

    /// Dispatches the updated snapshot.
    pub fn dispatch_updated(&self, snapshot: &ThermostatSnapshot) {
        for callback in snapshot_of(&self.updated_callbacks) {
            callback(snapshot);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.state_changed_callbacks.read().len()
            + self.updated_callbacks.read().len()
            + self.preset_callbacks.read().len()
            + self.hvac_mode_callbacks.read().len()
            + self.room_temperature_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
