// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT transport using mockforge-mqtt.

use std::time::Duration;

use besmart_bridge::ProtocolError;
use besmart_bridge::climate::ClimateState;
use besmart_bridge::config::{ReconnectionPolicy, ThermostatConfig};
use besmart_bridge::protocol::MqttBroker;
use besmart_bridge::types::{PresetMode, ThermostatId};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind
    sleep(Duration::from_millis(500)).await;
}

async fn connect(port: u16) -> MqttBroker {
    MqttBroker::builder()
        .host("127.0.0.1")
        .port(port)
        .connection_timeout(Duration::from_secs(5))
        .build()
        .await
        .expect("broker should accept the connection")
}

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;

        assert!(broker.is_connected());
        assert_eq!(broker.host(), "127.0.0.1");
        assert_eq!(broker.port(), port);
    }

    #[tokio::test]
    async fn connection_refused_fails_fast() {
        let port = get_test_port();

        let result = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_secs(2))
            .reconnection(ReconnectionPolicy::disabled())
            .build()
            .await;

        assert!(matches!(
            result,
            Err(ProtocolError::ConnectionFailed(_) | ProtocolError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn disconnect() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;
        broker.disconnect().await.unwrap();

        assert!(!broker.is_connected());
    }
}

mod thermostats {
    use super::*;

    #[tokio::test]
    async fn register_thermostat() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;
        let config = ThermostatConfig::new("0012AB", "4").with_name("Living room");
        let thermostat = broker.thermostat(&config).await.unwrap();

        assert_eq!(thermostat.id(), &ThermostatId::new("0012AB", "4"));
        assert_eq!(thermostat.name(), "Living room");
        assert_eq!(broker.router().active_thermostat_count(), 1);
        assert_eq!(broker.router().topics(), vec!["besmart/0012AB/4/status"]);
    }

    #[tokio::test]
    async fn wildcard_id_rejected() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;
        let result = broker.thermostat(&ThermostatConfig::new("0012AB", "+")).await;

        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
        assert_eq!(broker.router().thermostat_count(), 0);
    }

    #[tokio::test]
    async fn publish_commands() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;
        let thermostat = broker
            .thermostat(&ThermostatConfig::new("0012AB", "4"))
            .await
            .unwrap();

        let payload = thermostat.set_preset_mode("PARTY").await.unwrap();
        assert_eq!(payload.value, serde_json::json!(3));
        assert_eq!(thermostat.preset_mode(), PresetMode::Party);

        let payload = thermostat.set_temperature(22.0).await.unwrap().unwrap();
        assert_eq!(payload.command, "setComfortTemperature");
    }

    #[tokio::test]
    async fn dropped_thermostat_is_unrouted() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker = connect(port).await;
        let thermostat = broker
            .thermostat(&ThermostatConfig::new("0012AB", "5"))
            .await
            .unwrap();
        drop(thermostat);

        assert_eq!(broker.router().active_thermostat_count(), 0);
        assert!(!broker.router().route("besmart/0012AB/5/status", "{}"));
    }
}

// NOTE: mockforge-mqtt does not forward publishes between clients, so
// status delivery is covered by the TopicRouter unit tests and by
// tests/thermostat_engine.rs, which drive the engine directly.
