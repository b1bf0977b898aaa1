// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT topic routing for thermostat engines.
//!
//! The [`TopicRouter`] maps each status topic to the engine of the
//! thermostat it describes. It holds weak references so a dropped
//! thermostat needs no explicit cleanup.
//!
//! # Architecture
//!
//! ```text
//! MQTT Message: besmart/0012AB/4/status → {"roomTemp":19.5}
//!                     ↓
//!             TopicRouter.route()
//!                     ↓
//!     Lookup "besmart/0012AB/4/status" in subscribers
//!                     ↓
//!        Weak<ThermostatCore>.upgrade()
//!                     ↓
//!        parse payload, merge into snapshot
//!                     ↓
//!           Host callbacks invoked
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::protocol::CommandSink;
use crate::thermostat::{Thermostat, ThermostatCore};
use crate::types::ThermostatId;

/// Routes status messages to thermostat engines.
#[derive(Debug, Default)]
pub struct TopicRouter {
    /// Map from status topic to weak reference to the engine.
    subscribers: RwLock<HashMap<String, Weak<ThermostatCore>>>,
}

impl TopicRouter {
    /// Creates a new empty topic router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a thermostat and returns the status topic it listens on.
    ///
    /// A previous registration for the same identity is replaced.
    pub fn register<S: CommandSink>(&self, thermostat: &Thermostat<S>) -> String {
        let topic = thermostat.id().status_topic();
        tracing::debug!(topic = %topic, "Registering thermostat for routing");
        self.subscribers
            .write()
            .insert(topic.clone(), Arc::downgrade(thermostat.core()));
        topic
    }

    /// Unregisters a thermostat.
    ///
    /// Returns `true` if the thermostat was previously registered.
    pub fn unregister(&self, id: &ThermostatId) -> bool {
        let topic = id.status_topic();
        tracing::debug!(topic = %topic, "Unregistering thermostat from routing");
        self.subscribers.write().remove(&topic).is_some()
    }

    /// Routes a status message to its thermostat.
    ///
    /// Malformed payloads are logged and dropped; the thermostat keeps its
    /// last good state. Returns `true` if the message reached a live
    /// thermostat, even if it was then dropped.
    pub fn route(&self, topic: &str, payload: &str) -> bool {
        let core = {
            let subscribers = self.subscribers.read();
            subscribers.get(topic).and_then(Weak::upgrade)
        };

        let Some(core) = core else {
            tracing::trace!(topic = %topic, "No registered thermostat for topic");
            return false;
        };

        if let Err(e) = core.handle_status_payload(payload) {
            tracing::warn!(
                thermostat = %core.id(),
                error = %e,
                payload = %payload,
                "Dropping malformed status message"
            );
        }
        true
    }

    /// Returns the status topics of every live thermostat.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.subscribers
            .read()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    /// Removes entries whose thermostat has been dropped.
    pub fn cleanup(&self) {
        self.subscribers.write().retain(|topic, weak| {
            let alive = weak.strong_count() > 0;
            if !alive {
                tracing::debug!(topic = %topic, "Cleaning up dropped thermostat");
            }
            alive
        });
    }

    /// Returns the number of registered thermostats.
    #[must_use]
    pub fn thermostat_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns the number of registered thermostats still alive.
    #[must_use]
    pub fn active_thermostat_count(&self) -> usize {
        self.subscribers
            .read()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
