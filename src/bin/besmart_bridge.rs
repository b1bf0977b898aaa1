// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Besmart bridge process.
//!
//! Usage: `besmart-bridge [CONFIG]` (default `besmart.toml`). Log verbosity
//! follows `RUST_LOG` and defaults to `info`.

use std::process::ExitCode;

use besmart_bridge::climate::ClimateState;
use besmart_bridge::config::BridgeConfig;
use besmart_bridge::protocol::MqttBroker;
use besmart_bridge::subscription::Subscribable;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "besmart.toml";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Bridge stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> besmart_bridge::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = BridgeConfig::from_file(&path)?;

    tracing::info!(
        path = %path,
        thermostats = config.thermostats.len(),
        "Loaded configuration"
    );

    let broker = MqttBroker::builder()
        .settings(&config.broker)
        .reconnection(config.reconnection.clone())
        .build()
        .await?;

    let mut thermostats = Vec::with_capacity(config.thermostats.len());
    for thermostat_config in &config.thermostats {
        let thermostat = broker.thermostat(thermostat_config).await?;

        let name = thermostat.name().to_string();
        thermostat.on_updated(move |snapshot| {
            tracing::info!(
                thermostat = %name,
                room_temperature = snapshot.room_temperature(),
                target_temperature = snapshot.target_temperature(),
                preset = %snapshot.preset_mode(),
                hvac_mode = %snapshot.hvac_mode(),
                heating = snapshot.heating(),
                "Thermostat updated"
            );
        });
        thermostats.push(thermostat);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for shutdown signal");
    }

    tracing::info!("Shutting down");
    broker.disconnect().await?;
    drop(thermostats);
    Ok(())
}
