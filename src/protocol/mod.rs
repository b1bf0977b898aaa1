// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport plumbing between the broker and the thermostat engines.
//!
//! - [`CommandSink`]: outbound seam used by a thermostat to publish commands
//! - [`TopicRouter`]: routes inbound status messages to the matching engine
//! - [`MqttBroker`]: rumqttc-backed broker connection (feature `mqtt`)

#[cfg(feature = "mqtt")]
mod mqtt_broker;
mod topic_router;

#[cfg(feature = "mqtt")]
pub use mqtt_broker::{MqttBroker, MqttBrokerBuilder};
pub use topic_router::TopicRouter;

use std::future::Future;
use std::sync::Arc;

use crate::error::ProtocolError;

/// Destination for outbound command payloads.
///
/// Publishing must not block status ingestion: implementations hand the
/// payload to a bounded queue or fail fast.
pub trait CommandSink: Send + Sync {
    /// Publishes a payload on a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the payload could not be handed to the
    /// transport.
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}

impl<S: CommandSink> CommandSink for Arc<S> {
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send {
        S::publish(self, topic, payload)
    }
}

/// A sink that discards every payload.
///
/// Useful for a thermostat that is not yet attached to a broker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CommandSink for NullSink {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), ProtocolError> {
        tracing::debug!(topic = %topic, payload = %payload, "Discarding command");
        Ok(())
    }
}
