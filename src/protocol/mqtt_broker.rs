// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker connection for Besmart thermostats.
//!
//! One connection is shared by every thermostat. Status topics are routed
//! to their engines by a [`TopicRouter`], and commands are published on the
//! shared command topic.
//!
//! # Examples
//!
//! ```no_run
//! use besmart_bridge::config::ThermostatConfig;
//! use besmart_bridge::protocol::MqttBroker;
//!
//! # async fn example() -> besmart_bridge::Result<()> {
//! let broker = MqttBroker::builder()
//!     .host("192.168.1.50")
//!     .port(1883)
//!     .credentials("user", "password")
//!     .build()
//!     .await?;
//!
//! let thermostat = broker
//!     .thermostat(&ThermostatConfig::new("0012AB", "4"))
//!     .await?;
//! thermostat.set_temperature(21.0).await?;
//!
//! broker.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::sync::oneshot;

use crate::config::{BrokerSettings, ReconnectionPolicy, ThermostatConfig};
use crate::error::ProtocolError;
use crate::protocol::{CommandSink, TopicRouter};
use crate::thermostat::Thermostat;

/// Global counter for generating unique client IDs.
static BROKER_CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Capacity of the rumqttc request channel.
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Configuration for an MQTT broker connection.
#[derive(Debug, Clone)]
pub(crate) struct MqttBrokerConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    connection_timeout: Duration,
    publish_timeout: Duration,
    reconnection: ReconnectionPolicy,
}

impl Default for MqttBrokerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(5),
            reconnection: ReconnectionPolicy::default(),
        }
    }
}

/// An MQTT broker connection shared by all thermostats.
///
/// `MqttBroker` is cheaply cloneable (via `Arc`).
#[derive(Clone)]
pub struct MqttBroker {
    inner: Arc<MqttBrokerInner>,
}

struct MqttBrokerInner {
    client: AsyncClient,
    router: TopicRouter,
    config: MqttBrokerConfig,
    connected: AtomicBool,
    /// Set by [`MqttBroker::disconnect`] so the event loop stops retrying.
    closing: AtomicBool,
}

impl MqttBroker {
    /// Creates a new builder for configuring an MQTT broker connection.
    #[must_use]
    pub fn builder() -> MqttBrokerBuilder {
        MqttBrokerBuilder::default()
    }

    /// Returns whether the broker is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the host address of the broker.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    /// Returns the port of the broker.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.config.port
    }

    /// Returns the router dispatching status messages.
    #[must_use]
    pub fn router(&self) -> &TopicRouter {
        &self.inner.router
    }

    /// Creates a thermostat on this connection and subscribes to its
    /// status topic.
    ///
    /// The thermostat is routed by weak reference: dropping every clone of
    /// it stops delivery.
    ///
    /// # Errors
    ///
    /// Returns error if an id is not a literal topic level or the MQTT
    /// subscription fails.
    pub async fn thermostat(
        &self,
        config: &ThermostatConfig,
    ) -> Result<Thermostat<MqttBroker>, ProtocolError> {
        let id = config.id();
        if !id.is_valid() {
            return Err(ProtocolError::InvalidAddress(format!(
                "thermostat id {id} is not a literal topic level"
            )));
        }

        let thermostat = Thermostat::from_config(config, Arc::new(self.clone()));
        let topic = self.inner.router.register(&thermostat);

        self.inner
            .client
            .subscribe(&topic, QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)?;

        tracing::info!(
            thermostat = %thermostat.id(),
            name = %config.name,
            topic = %topic,
            "Subscribed to thermostat status"
        );
        Ok(thermostat)
    }

    /// Re-subscribes every live status topic after a reconnect.
    fn resubscribe(&self) {
        self.inner.router.cleanup();
        for topic in self.inner.router.topics() {
            // Non-blocking: the event loop that drains the queue is the caller
            if let Err(e) = self.inner.client.try_subscribe(&topic, QoS::AtLeastOnce) {
                tracing::warn!(topic = %topic, error = %e, "Failed to re-subscribe");
            } else {
                tracing::debug!(topic = %topic, "Re-subscribed");
            }
        }
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );

        self.inner.closing.store(true, Ordering::Release);
        self.inner
            .client
            .disconnect()
            .await
            .map_err(ProtocolError::Mqtt)?;

        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }
}

impl CommandSink for MqttBroker {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), ProtocolError> {
        let timeout = self.inner.config.publish_timeout;
        let publish = self
            .inner
            .client
            .publish(topic, QoS::AtLeastOnce, false, payload);

        match tokio::time::timeout(timeout, publish).await {
            Ok(result) => result.map_err(ProtocolError::Mqtt),
            Err(_) => Err(ProtocolError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}

impl std::fmt::Debug for MqttBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBroker")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

/// Builder for creating an MQTT broker connection.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use besmart_bridge::config::ReconnectionPolicy;
/// use besmart_bridge::protocol::MqttBroker;
///
/// # async fn example() -> besmart_bridge::Result<()> {
/// let broker = MqttBroker::builder()
///     .host("192.168.1.50")
///     .credentials("user", "password")
///     .keep_alive(Duration::from_secs(60))
///     .reconnection(ReconnectionPolicy::new().with_infinite_retries())
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MqttBrokerBuilder {
    config: MqttBrokerConfig,
}

impl MqttBrokerBuilder {
    /// Applies host, port and credentials from loaded settings.
    #[must_use]
    pub fn settings(self, settings: &BrokerSettings) -> Self {
        self.host(&settings.host)
            .port(settings.port)
            .credentials(&settings.username, &settings.password)
    }

    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Sets how long a publish may wait for queue space (default: 5 seconds).
    #[must_use]
    pub fn publish_timeout(mut self, duration: Duration) -> Self {
        self.config.publish_timeout = duration;
        self
    }

    /// Sets the reconnection policy of the event loop.
    #[must_use]
    pub fn reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.config.reconnection = policy;
        self
    }

    /// Builds and connects to the MQTT broker.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - Connection fails
    /// - Connection times out
    pub async fn build(self) -> Result<MqttBroker, ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let counter = BROKER_CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!("besmart_bridge_{}_{}", std::process::id(), counter);

        let mut mqtt_options = MqttOptions::new(&client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, REQUEST_CHANNEL_CAPACITY);

        let broker = MqttBroker {
            inner: Arc::new(MqttBrokerInner {
                client,
                router: TopicRouter::new(),
                config: self.config.clone(),
                connected: AtomicBool::new(false),
                closing: AtomicBool::new(false),
            }),
        };

        let broker_clone = broker.clone();
        let (connack_tx, connack_rx) = oneshot::channel();

        tokio::spawn(async move {
            handle_broker_events(event_loop, broker_clone, connack_tx).await;
        });

        let timeout = self.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %self.config.host,
                    port = %self.config.port,
                    "Connected to MQTT broker"
                );
                Ok(broker)
            }
            Ok(Err(_)) => Err(ProtocolError::ConnectionFailed(
                "MQTT event loop terminated unexpectedly".to_string(),
            )),
            Err(_) => {
                broker.inner.closing.store(true, Ordering::Release);
                Err(ProtocolError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                ))
            }
        }
    }
}

/// Drives the MQTT event loop, reconnecting per the broker's policy.
///
/// A failure before the first ConnAck ends the task so that `build` can
/// report it. After that, errors are retried with backoff and every status
/// topic is re-subscribed on reconnect.
async fn handle_broker_events(
    mut event_loop: EventLoop,
    broker: MqttBroker,
    connack_tx: oneshot::Sender<()>,
) {
    let mut connack_tx = Some(connack_tx);
    let mut attempt: u32 = 0;
    let policy = broker.inner.config.reconnection.clone();

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT broker connected");
                broker.inner.connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                } else {
                    tracing::info!(attempt, "Reconnected to MQTT broker");
                    broker.resubscribe();
                }
                attempt = 0;
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match std::str::from_utf8(&publish.payload) {
                    Ok(payload) => {
                        tracing::debug!(
                            topic = %publish.topic,
                            payload = %payload,
                            "MQTT message received"
                        );
                        broker.inner.router.route(&publish.topic, payload);
                    }
                    Err(e) => {
                        tracing::warn!(
                            topic = %publish.topic,
                            error = %e,
                            "Dropping non UTF-8 message"
                        );
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect) | Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                broker.inner.connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                broker.inner.connected.store(false, Ordering::Release);

                if connack_tx.is_some() || broker.inner.closing.load(Ordering::Acquire) {
                    tracing::error!(error = %e, "MQTT broker event loop error");
                    break;
                }
                if !policy.should_retry(attempt) {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "MQTT broker unreachable, giving up"
                    );
                    break;
                }

                let delay = policy.delay_for_attempt(attempt);
                attempt += 1;
                tracing::warn!(
                    error = %e,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "MQTT connection lost, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
