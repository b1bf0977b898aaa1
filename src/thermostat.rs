// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The thermostat state engine.
//!
//! A [`Thermostat`] owns the snapshot of one physical device. Two paths
//! mutate it: inbound status messages delivered by the transport, and
//! intents issued by the host. Both go through the same per-device lock,
//! so a reader never observes a half-applied update. Notifications are
//! queued under that lock and delivered after it is released, one at a
//! time and in the order the updates were applied. A callback may read the
//! engine; an update it triggers is delivered after the current one.
//!
//! Intents differ in how they treat local state:
//!
//! | Intent | Local update | Command published |
//! |--------|--------------|-------------------|
//! | [`Thermostat::set_hvac_mode`] | season | none |
//! | [`Thermostat::set_preset_mode`] | work mode | `setMode` |
//! | [`Thermostat::set_temperature`] | none | `setComfortTemperature` |
//!
//! A failed publish is reported to the caller; the optimistic local update
//! is kept.
//!
//! # Examples
//!
//! ```
//! use besmart_bridge::protocol::NullSink;
//! use besmart_bridge::thermostat::Thermostat;
//! use besmart_bridge::types::{PresetMode, ThermostatId};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> besmart_bridge::Result<()> {
//! let thermostat = Thermostat::new(ThermostatId::new("box", "t1"), NullSink);
//!
//! thermostat.handle_status_payload(r#"{"roomTemp":19.5,"mode":1}"#)?;
//! assert_eq!(thermostat.snapshot().preset_mode(), PresetMode::Manual);
//!
//! let payload = thermostat.set_preset_mode("PARTY").await?;
//! assert_eq!(payload.command, "setMode");
//! assert_eq!(thermostat.snapshot().preset_mode(), PresetMode::Party);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::climate::{ClimateControl, ClimateState, StateAttributes};
use crate::command::{
    COMMAND_TOPIC, Command, CommandPayload, SetComfortTemperatureCommand, SetModeCommand,
};
use crate::config::{DEFAULT_NAME, DEFAULT_ROOM, ThermostatConfig};
use crate::error::{ParseError, Result};
use crate::protocol::CommandSink;
use crate::state::{StateChange, ThermostatSnapshot};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::telemetry::{StatusField, StatusMessage};
use crate::types::{HvacAction, HvacMode, PresetMode, Season, TemperatureUnit, ThermostatId};

/// Changes applied by one merge or intent, with the state they produced.
#[derive(Debug)]
struct Notification {
    changes: Vec<StateChange>,
    snapshot: ThermostatSnapshot,
}

/// Notifications waiting for delivery, oldest first.
#[derive(Debug, Default)]
struct Outbox {
    pending: VecDeque<Notification>,
    /// Set while some call is delivering the queue.
    draining: bool,
}

/// State shared between a thermostat handle and the topic router.
#[derive(Debug)]
pub(crate) struct ThermostatCore {
    id: ThermostatId,
    name: String,
    room: String,
    state: RwLock<ThermostatSnapshot>,
    callbacks: CallbackRegistry,
    outbox: Mutex<Outbox>,
    last_status_at: RwLock<Option<DateTime<Utc>>>,
}

impl ThermostatCore {
    fn new(id: ThermostatId, name: String, room: String) -> Self {
        Self {
            state: RwLock::new(ThermostatSnapshot::new(id.clone())),
            id,
            name,
            room,
            callbacks: CallbackRegistry::new(),
            outbox: Mutex::new(Outbox::default()),
            last_status_at: RwLock::new(None),
        }
    }

    pub(crate) fn id(&self) -> &ThermostatId {
        &self.id
    }

    /// Applies changes under one write lock, then notifies.
    ///
    /// Returns the fields that actually changed.
    fn apply_all(&self, changes: Vec<StateChange>) -> Vec<StatusField> {
        let fields = {
            let mut state = self.state.write();
            let applied: Vec<StateChange> = changes
                .into_iter()
                .filter(|change| state.apply(change))
                .collect();
            let fields = applied.iter().map(StateChange::field).collect::<Vec<_>>();

            // Queued while the state lock is held so delivery follows apply order
            if !applied.is_empty() && !self.callbacks.is_empty() {
                self.outbox.lock().pending.push_back(Notification {
                    changes: applied,
                    snapshot: (*state).clone(),
                });
            }
            fields
        };

        self.deliver();
        fields
    }

    /// Delivers queued notifications unless another call already is.
    ///
    /// The delivering call drains the queue before returning, including
    /// anything queued by other threads or by the callbacks themselves.
    fn deliver(&self) {
        {
            let mut outbox = self.outbox.lock();
            if outbox.draining || outbox.pending.is_empty() {
                return;
            }
            outbox.draining = true;
        }

        loop {
            let notification = {
                let mut outbox = self.outbox.lock();
                match outbox.pending.pop_front() {
                    Some(notification) => notification,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };

            for change in &notification.changes {
                self.callbacks.dispatch(change);
            }
            self.callbacks.dispatch_updated(&notification.snapshot);
        }
    }

    pub(crate) fn merge(&self, message: &StatusMessage) -> bool {
        let changes = message.to_state_changes();
        let field_count = changes.len();
        let changed = self.apply_all(changes);
        *self.last_status_at.write() = Some(Utc::now());

        tracing::debug!(
            thermostat = %self.id,
            fields = field_count,
            changed = ?changed,
            "Merged status message"
        );
        !changed.is_empty()
    }

    pub(crate) fn handle_status_payload(
        &self,
        payload: &str,
    ) -> std::result::Result<bool, ParseError> {
        let message = StatusMessage::from_json(payload)?;
        Ok(self.merge(&message))
    }
}

/// A Besmart thermostat bound to a command sink.
///
/// Cloning is cheap and every clone shares the same state and
/// subscriptions.
pub struct Thermostat<S: CommandSink> {
    core: Arc<ThermostatCore>,
    sink: Arc<S>,
}

impl<S: CommandSink> Clone for Thermostat<S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: CommandSink> std::fmt::Debug for Thermostat<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thermostat")
            .field("id", &self.core.id)
            .field("name", &self.core.name)
            .field("room", &self.core.room)
            .finish_non_exhaustive()
    }
}

impl<S: CommandSink> Thermostat<S> {
    /// Creates a thermostat with the default name and room.
    #[must_use]
    pub fn new(id: ThermostatId, sink: S) -> Self {
        Self::with_labels(id, DEFAULT_NAME, DEFAULT_ROOM, Arc::new(sink))
    }

    /// Creates a thermostat from its configuration, sharing a sink.
    #[must_use]
    pub fn from_config(config: &ThermostatConfig, sink: Arc<S>) -> Self {
        Self::with_labels(config.id(), &config.name, &config.room, sink)
    }

    fn with_labels(id: ThermostatId, name: &str, room: &str, sink: Arc<S>) -> Self {
        Self {
            core: Arc::new(ThermostatCore::new(id, name.to_string(), room.to_string())),
            sink,
        }
    }

    pub(crate) fn core(&self) -> &Arc<ThermostatCore> {
        &self.core
    }

    /// Returns the thermostat identity.
    #[must_use]
    pub fn id(&self) -> &ThermostatId {
        &self.core.id
    }

    /// Returns a consistent copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ThermostatSnapshot {
        self.core.state.read().clone()
    }

    /// Returns when the last status message was merged.
    #[must_use]
    pub fn last_status_at(&self) -> Option<DateTime<Utc>> {
        *self.core.last_status_at.read()
    }

    // ========== Inbound ==========

    /// Merges a status message into the snapshot.
    ///
    /// Fields missing from the message keep their values. Returns whether
    /// anything changed.
    pub fn merge(&self, message: &StatusMessage) -> bool {
        self.core.merge(message)
    }

    /// Parses a raw status payload and merges it.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is malformed; the snapshot is
    /// left untouched.
    pub fn handle_status_payload(
        &self,
        payload: &str,
    ) -> std::result::Result<bool, ParseError> {
        self.core.handle_status_payload(payload)
    }

    // ========== Intents ==========

    /// Switches between heating and cooling.
    ///
    /// Only local state is updated; the controller has no season command.
    pub fn set_hvac_mode(&self, mode: HvacMode) {
        tracing::info!(thermostat = %self.core.id, mode = %mode, "Setting HVAC mode");
        self.core
            .apply_all(vec![StateChange::Season(Season::from(mode))]);
    }

    /// Selects a preset by name and sends it to the controller.
    ///
    /// Unknown names select [`PresetMode::Auto`].
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be published. The local work mode
    /// has already been updated.
    pub async fn set_preset_mode(&self, preset: &str) -> Result<CommandPayload> {
        let resolved = PresetMode::from_name_or_auto(preset);
        if resolved.as_str() != preset {
            tracing::warn!(
                thermostat = %self.core.id,
                preset = %preset,
                "Unknown preset, falling back to AUTO"
            );
        }
        self.set_preset(resolved).await
    }

    /// Selects a preset and sends it to the controller.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be published. The local work mode
    /// has already been updated.
    pub async fn set_preset(&self, preset: PresetMode) -> Result<CommandPayload> {
        tracing::info!(thermostat = %self.core.id, preset = %preset, "Setting preset");
        let command = SetModeCommand::from_preset(preset);
        self.core
            .apply_all(vec![StateChange::WorkMode(i64::from(command.mode().code()))]);
        self.send(&command).await
    }

    /// Requests a new comfort temperature.
    ///
    /// The snapshot is not changed; the new setpoint appears once the
    /// controller echoes it in a status message. A temperature of zero means
    /// "no value" to the host and nothing is sent; `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Returns error if the value is not finite or the command cannot be
    /// published.
    pub async fn set_temperature(&self, temperature: f64) -> Result<Option<CommandPayload>> {
        if temperature.abs() < f64::EPSILON {
            tracing::debug!(thermostat = %self.core.id, "Ignoring empty temperature");
            return Ok(None);
        }

        tracing::info!(thermostat = %self.core.id, temperature, "Setting temperature");
        let command = SetComfortTemperatureCommand::new(temperature)?;
        self.send(&command).await.map(Some)
    }

    async fn send<C: Command + Sync>(&self, command: &C) -> Result<CommandPayload> {
        let payload = command.to_payload(&self.core.id);
        let json = payload.to_json()?;

        tracing::debug!(
            thermostat = %self.core.id,
            topic = COMMAND_TOPIC,
            payload = %json,
            "Publishing command"
        );

        if let Err(e) = self.sink.publish(COMMAND_TOPIC, json).await {
            tracing::warn!(
                thermostat = %self.core.id,
                command = command.name(),
                error = %e,
                "Command delivery failed"
            );
            return Err(e.into());
        }
        Ok(payload)
    }
}

impl<S: CommandSink> ClimateState for Thermostat<S> {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn room(&self) -> &str {
        &self.core.room
    }

    fn current_temperature(&self) -> f64 {
        self.core.state.read().room_temperature()
    }

    fn target_temperature(&self) -> f64 {
        self.core.state.read().target_temperature()
    }

    fn target_temperature_high(&self) -> f64 {
        self.core.state.read().target_temperature_high()
    }

    fn target_temperature_low(&self) -> f64 {
        self.core.state.read().target_temperature_low()
    }

    fn min_temp(&self) -> f64 {
        self.core.state.read().min_setpoint()
    }

    fn max_temp(&self) -> f64 {
        self.core.state.read().max_setpoint()
    }

    fn temperature_unit(&self) -> TemperatureUnit {
        self.core.state.read().temperature_unit()
    }

    fn hvac_mode(&self) -> HvacMode {
        self.core.state.read().hvac_mode()
    }

    fn hvac_action(&self) -> HvacAction {
        self.core.state.read().hvac_action()
    }

    fn preset_mode(&self) -> PresetMode {
        self.core.state.read().preset_mode()
    }

    fn extra_state_attributes(&self) -> StateAttributes {
        StateAttributes::from(&*self.core.state.read())
    }
}

impl<S: CommandSink> ClimateControl for Thermostat<S> {
    async fn set_hvac_mode(&self, mode: HvacMode) -> Result<()> {
        Thermostat::set_hvac_mode(self, mode);
        Ok(())
    }

    async fn set_preset_mode(&self, preset: &str) -> Result<()> {
        Thermostat::set_preset_mode(self, preset).await.map(|_| ())
    }

    async fn set_temperature(&self, temperature: f64) -> Result<()> {
        Thermostat::set_temperature(self, temperature)
            .await
            .map(|_| ())
    }
}

impl<S: CommandSink> Subscribable for Thermostat<S> {
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.core.callbacks.on_state_changed(callback)
    }

    fn on_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ThermostatSnapshot) + Send + Sync + 'static,
    {
        self.core.callbacks.on_updated(callback)
    }

    fn on_preset_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PresetMode) + Send + Sync + 'static,
    {
        self.core.callbacks.on_preset_changed(callback)
    }

    fn on_hvac_mode_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(HvacMode) + Send + Sync + 'static,
    {
        self.core.callbacks.on_hvac_mode_changed(callback)
    }

    fn on_room_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.core.callbacks.on_room_temperature_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.callbacks.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::NullSink;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn thermostat() -> Thermostat<NullSink> {
        Thermostat::new(ThermostatId::new("0012AB", "4"), NullSink)
    }

    #[test]
    fn new_uses_default_labels() {
        let t = thermostat();
        assert_eq!(t.name(), DEFAULT_NAME);
        assert_eq!(t.room(), DEFAULT_ROOM);
        assert!(!t.should_poll());
        assert!(t.last_status_at().is_none());
    }

    #[test]
    fn from_config_uses_labels() {
        let config = ThermostatConfig::new("b", "t").with_name("Office").with_room("office");
        let t = Thermostat::from_config(&config, Arc::new(NullSink));
        assert_eq!(t.name(), "Office");
        assert_eq!(t.room(), "office");
        assert_eq!(t.id(), &ThermostatId::new("b", "t"));
    }

    #[test]
    fn merge_records_timestamp() {
        let t = thermostat();
        assert!(t.handle_status_payload(r#"{"roomTemp":20.0}"#).unwrap());
        assert!(t.last_status_at().is_some());
        assert_eq!(t.current_temperature(), 20.0);
    }

    #[test]
    fn malformed_payload_leaves_state() {
        let t = thermostat();
        t.handle_status_payload(r#"{"roomTemp":20.0}"#).unwrap();
        let before = t.snapshot();

        assert!(t.handle_status_payload(r#"{"roomTemp":"warm"}"#).is_err());
        assert!(t.handle_status_payload("{").is_err());
        assert_eq!(t.snapshot(), before);
    }

    #[test]
    fn updated_fires_once_per_merge() {
        let t = thermostat();
        let updates = Arc::new(AtomicU32::new(0));
        let changes = Arc::new(AtomicU32::new(0));
        let updates_clone = updates.clone();
        let changes_clone = changes.clone();

        t.on_updated(move |_| {
            updates_clone.fetch_add(1, Ordering::SeqCst);
        });
        t.on_state_changed(move |_| {
            changes_clone.fetch_add(1, Ordering::SeqCst);
        });

        t.handle_status_payload(r#"{"roomTemp":20.0,"heating":true,"mode":2}"#)
            .unwrap();
        assert_eq!(updates.load(Ordering::SeqCst), 1);
        assert_eq!(changes.load(Ordering::SeqCst), 3);

        // Same values again: nothing changed, nothing notified
        t.handle_status_payload(r#"{"roomTemp":20.0}"#).unwrap();
        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_can_read_engine() {
        let t = thermostat();
        let reader = t.clone();
        let seen = Arc::new(RwLock::new(None));
        let seen_clone = seen.clone();

        t.on_updated(move |_| {
            *seen_clone.write() = Some(reader.current_temperature());
        });
        t.handle_status_payload(r#"{"roomTemp":18.5}"#).unwrap();

        assert_eq!(*seen.read(), Some(18.5));
    }

    #[test]
    fn set_hvac_mode_is_local() {
        let t = thermostat();
        let modes = Arc::new(RwLock::new(Vec::new()));
        let modes_clone = modes.clone();
        t.on_hvac_mode_changed(move |mode| modes_clone.write().push(mode));

        t.set_hvac_mode(HvacMode::Cool);
        assert_eq!(t.hvac_mode(), HvacMode::Cool);
        assert_eq!(t.snapshot().season(), Season::Cool);
        assert_eq!(*modes.read(), vec![HvacMode::Cool]);
    }

    #[tokio::test]
    async fn set_temperature_rejects_nan() {
        let t = thermostat();
        let result = t.set_temperature(f64::NAN).await;
        assert!(matches!(result, Err(crate::Error::Value(_))));
    }

    #[tokio::test]
    async fn climate_control_ignores_zero_temperature() {
        let t = thermostat();
        assert!(ClimateControl::set_temperature(&t, 0.0).await.is_ok());
        assert_eq!(t.set_temperature(0.0).await.unwrap(), None);
    }

    #[test]
    fn slow_callback_keeps_updates_in_order() {
        let t = thermostat();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let in_callback = Arc::new(Barrier::new(2));

        let seen_clone = seen.clone();
        let barrier = in_callback.clone();
        t.on_updated(move |snapshot| {
            let temperature = snapshot.room_temperature();
            if temperature == 20.0 {
                barrier.wait();
                std::thread::sleep(Duration::from_millis(100));
            }
            seen_clone.lock().push(temperature);
        });

        let first = t.clone();
        let handle = std::thread::spawn(move || {
            first.handle_status_payload(r#"{"roomTemp":20.0}"#).unwrap();
        });

        // The second merge lands while the first notification is in flight
        in_callback.wait();
        t.handle_status_payload(r#"{"roomTemp":21.0}"#).unwrap();
        handle.join().unwrap();

        assert_eq!(*seen.lock(), vec![20.0, 21.0]);
        assert_eq!(t.current_temperature(), 21.0);
    }

    #[test]
    fn update_from_callback_is_delivered_next() {
        let t = thermostat();
        let engine = t.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        t.on_updated(move |snapshot| {
            seen_clone.lock().push(snapshot.hvac_mode());
            if snapshot.hvac_mode() == HvacMode::Heat {
                engine.set_hvac_mode(HvacMode::Cool);
            }
        });
        t.handle_status_payload(r#"{"roomTemp":19.0}"#).unwrap();

        assert_eq!(*seen.lock(), vec![HvacMode::Heat, HvacMode::Cool]);
        assert_eq!(t.hvac_mode(), HvacMode::Cool);
    }

    #[tokio::test]
    async fn climate_control_delegates() {
        let t = thermostat();
        ClimateControl::set_preset_mode(&t, "ECO").await.unwrap();
        assert_eq!(t.preset_mode(), PresetMode::Eco);

        ClimateControl::set_hvac_mode(&t, HvacMode::Cool).await.unwrap();
        assert_eq!(t.hvac_mode(), HvacMode::Cool);
    }
}
