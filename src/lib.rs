// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Besmart Bridge - exposes Besmart heating controllers as generic thermostats.
//!
//! The Besmart controller publishes partial status updates over MQTT and
//! accepts JSON commands on a shared topic. This library keeps an in-memory
//! snapshot per thermostat, merges every status message into it field by
//! field, and translates host intents into controller commands.
//!
//! # Features
//!
//! - **State engine**: partial merges, one lock per thermostat, host
//!   notifications after every effective change
//! - **Mode translation**: HVAC mode to season and preset to work mode, with
//!   safe fallbacks for unknown values
//! - **Transport**: shared rumqttc connection with reconnection and
//!   re-subscription (feature `mqtt`, enabled by default)
//! - **Configuration**: TOML file loading and validation
//!
//! # Quick Start
//!
//! ```no_run
//! use besmart_bridge::config::ThermostatConfig;
//! use besmart_bridge::protocol::MqttBroker;
//! use besmart_bridge::subscription::Subscribable;
//!
//! #[tokio::main]
//! async fn main() -> besmart_bridge::Result<()> {
//!     let broker = MqttBroker::builder()
//!         .host("192.168.1.50")
//!         .credentials("user", "password")
//!         .build()
//!         .await?;
//!
//!     let thermostat = broker
//!         .thermostat(&ThermostatConfig::new("0012AB", "4"))
//!         .await?;
//!
//!     thermostat.on_updated(|snapshot| {
//!         println!("room {:.1} -> {:.1}", snapshot.room_temperature(), snapshot.target_temperature());
//!     });
//!
//!     thermostat.set_preset_mode("ECO").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Without a Broker
//!
//! The engine does not depend on MQTT. Any [`protocol::CommandSink`] can
//! receive commands, and status payloads can be fed in directly:
//!
//! ```
//! use besmart_bridge::climate::ClimateState;
//! use besmart_bridge::protocol::NullSink;
//! use besmart_bridge::thermostat::Thermostat;
//! use besmart_bridge::types::{HvacMode, ThermostatId};
//!
//! let thermostat = Thermostat::new(ThermostatId::new("0012AB", "4"), NullSink);
//! thermostat.handle_status_payload(r#"{"roomTemp":20.5,"season":"0"}"#).unwrap();
//!
//! assert_eq!(thermostat.current_temperature(), 20.5);
//! assert_eq!(thermostat.hvac_mode(), HvacMode::Cool);
//! ```

pub mod climate;
pub mod command;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod telemetry;
pub mod thermostat;
pub mod types;

pub use climate::{ClimateControl, ClimateFeature, ClimateState, StateAttributes};
pub use command::{COMMAND_TOPIC, Command, CommandPayload};
pub use config::{BridgeConfig, ReconnectionPolicy, ThermostatConfig};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, ValueError};
#[cfg(feature = "mqtt")]
pub use protocol::{MqttBroker, MqttBrokerBuilder};
pub use protocol::{CommandSink, NullSink, TopicRouter};
pub use state::{StateChange, ThermostatSnapshot};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use thermostat::Thermostat;
pub use types::{HvacAction, HvacMode, PresetMode, Season, TemperatureUnit, ThermostatId, WorkMode};
