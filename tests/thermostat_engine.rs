// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Behavior tests for the thermostat state engine, driven through a
//! recording command sink.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use besmart_bridge::climate::{ClimateState, TARGET_TEMPERATURE_STEP};
use besmart_bridge::command::COMMAND_TOPIC;
use besmart_bridge::protocol::CommandSink;
use besmart_bridge::state::ThermostatSnapshot;
use besmart_bridge::subscription::Subscribable;
use besmart_bridge::telemetry::StatusMessage;
use besmart_bridge::thermostat::Thermostat;
use besmart_bridge::types::{HvacAction, HvacMode, PresetMode, TemperatureUnit, ThermostatId};
use besmart_bridge::{Error, ProtocolError};
use parking_lot::Mutex;

/// Sink that records every publish and can be switched to fail.
#[derive(Debug, Default)]
struct RecordingSink {
    published: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingSink {
    fn published(&self) -> Vec<(String, String)> {
        self.published.lock().clone()
    }
}

impl CommandSink for RecordingSink {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), ProtocolError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProtocolError::ChannelClosed("broker gone".to_string()));
        }
        self.published.lock().push((topic.to_string(), payload));
        Ok(())
    }
}

fn thermostat() -> (Thermostat<Arc<RecordingSink>>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let thermostat = Thermostat::new(ThermostatId::new("0012AB", "4"), Arc::clone(&sink));
    (thermostat, sink)
}

fn fresh() -> ThermostatSnapshot {
    ThermostatSnapshot::new(ThermostatId::new("0012AB", "4"))
}

mod merge {
    use super::*;

    #[test]
    fn defaults_before_any_update() {
        let (t, _) = thermostat();

        assert_eq!(t.min_temp(), 45.0);
        assert_eq!(t.max_temp(), 60.0);
        assert_eq!(t.preset_mode(), PresetMode::Idle);
        assert_eq!(t.hvac_mode(), HvacMode::Heat);
        assert_eq!(t.temperature_unit(), TemperatureUnit::Celsius);
        assert_eq!(t.snapshot().battery_state(), "0");
        assert_eq!(t.hvac_action(), HvacAction::Off);
    }

    #[test]
    fn merge_is_right_biased_union() {
        let u1 = r#"{"roomTemp":19.0,"currentSetPoint":20.0,"mode":1}"#;
        let u2 = r#"{"roomTemp":21.0,"heating":true}"#;
        let union = r#"{"roomTemp":21.0,"currentSetPoint":20.0,"mode":1,"heating":true}"#;

        let (sequential, _) = thermostat();
        sequential.handle_status_payload(u1).unwrap();
        sequential.handle_status_payload(u2).unwrap();

        let mut expected = fresh();
        for change in StatusMessage::from_json(union).unwrap().to_state_changes() {
            expected.apply(&change);
        }

        assert_eq!(sequential.snapshot(), expected);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let (t, _) = thermostat();
        t.handle_status_payload(
            r#"{"currentSetPoint":20.5,"comfortTemperature":21.0,"economyTemperature":17.0,"mode":2}"#,
        )
        .unwrap();

        t.handle_status_payload(r#"{"roomTemp":21.5}"#).unwrap();

        assert_eq!(t.current_temperature(), 21.5);
        assert_eq!(t.target_temperature(), 20.5);
        assert_eq!(t.target_temperature_high(), 21.0);
        assert_eq!(t.target_temperature_low(), 17.0);
        assert_eq!(t.preset_mode(), PresetMode::Eco);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (t, _) = thermostat();
        let changed = t
            .handle_status_payload(r#"{"roomTemp":20.0,"firmware":"1.2","extra":{"a":1}}"#)
            .unwrap();

        assert!(changed);
        assert_eq!(t.current_temperature(), 20.0);
    }

    #[test]
    fn out_of_range_mode_reads_idle() {
        let (t, _) = thermostat();
        t.handle_status_payload(r#"{"mode":3}"#).unwrap();
        t.handle_status_payload(r#"{"mode":99}"#).unwrap();

        assert_eq!(t.preset_mode(), PresetMode::Idle);
        assert_eq!(t.extra_state_attributes().mode, 99);
    }

    #[test]
    fn season_confirmed_by_device() {
        let (t, _) = thermostat();
        t.handle_status_payload(r#"{"season":"0"}"#).unwrap();
        assert_eq!(t.hvac_mode(), HvacMode::Cool);

        // Unknown season values fall back to heat
        t.handle_status_payload(r#"{"season":"7"}"#).unwrap();
        assert_eq!(t.hvac_mode(), HvacMode::Heat);
    }

    #[test]
    fn hvac_action_follows_heating_and_season() {
        let (t, _) = thermostat();
        t.handle_status_payload(r#"{"heating":true}"#).unwrap();
        assert_eq!(t.hvac_action(), HvacAction::Heating);

        t.set_hvac_mode(HvacMode::Cool);
        assert_eq!(t.hvac_action(), HvacAction::Cooling);

        t.handle_status_payload(r#"{"heating":false}"#).unwrap();
        assert_eq!(t.hvac_action(), HvacAction::Off);
    }

    #[test]
    fn malformed_messages_keep_last_good_state() {
        let (t, _) = thermostat();
        t.handle_status_payload(r#"{"roomTemp":19.0,"mode":1}"#).unwrap();
        let good = t.snapshot();

        assert!(t.handle_status_payload("").is_err());
        assert!(t.handle_status_payload("[1,2]").is_err());
        assert!(t.handle_status_payload(r#"{"roomTemp":20.0,"mode":"two"}"#).is_err());

        assert_eq!(t.snapshot(), good);
    }

    #[test]
    fn static_surface() {
        let (t, _) = thermostat();
        assert_eq!(t.target_temperature_step(), TARGET_TEMPERATURE_STEP);
        assert_eq!(t.hvac_modes(), &[HvacMode::Cool, HvacMode::Heat]);
        assert_eq!(
            t.preset_modes()
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>(),
            vec!["AUTO", "MANUAL", "ECO", "PARTY", "IDLE", "DHW"]
        );
    }

    #[test]
    fn first_updates_before_subscription_are_kept() {
        let (t, _) = thermostat();
        t.handle_status_payload(r#"{"roomTemp":18.0}"#).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        t.on_updated(move |s| seen_clone.lock().push(s.room_temperature()));

        t.handle_status_payload(r#"{"outSideTemp":4.0}"#).unwrap();
        assert_eq!(*seen.lock(), vec![18.0]);
    }
}

mod intents {
    use super::*;

    #[test]
    fn hvac_mode_round_trips_without_publishing() {
        let (t, sink) = thermostat();
        for mode in [HvacMode::Cool, HvacMode::Heat] {
            t.set_hvac_mode(mode);
            assert_eq!(t.hvac_mode(), mode);
        }
        assert!(sink.published().is_empty());
    }

    #[tokio::test]
    async fn preset_round_trips() {
        let (t, sink) = thermostat();
        for preset in PresetMode::ALL {
            t.set_preset_mode(preset.as_str()).await.unwrap();
            assert_eq!(t.preset_mode(), preset);
        }
        assert_eq!(sink.published().len(), PresetMode::ALL.len());
    }

    #[tokio::test]
    async fn unknown_preset_falls_back_to_auto() {
        let (t, sink) = thermostat();
        t.handle_status_payload(r#"{"mode":3}"#).unwrap();

        let payload = t.set_preset_mode("unknown-value").await.unwrap();

        assert_eq!(t.preset_mode(), PresetMode::Auto);
        assert_eq!(t.snapshot().work_mode_code(), 0);
        assert_eq!(payload.value, serde_json::json!(0));
        assert_eq!(sink.published().len(), 1);
    }

    #[tokio::test]
    async fn party_preset_emits_exactly_one_payload() {
        let (t, sink) = thermostat();
        t.set_preset_mode("PARTY").await.unwrap();

        assert_eq!(
            sink.published(),
            vec![(
                COMMAND_TOPIC.to_string(),
                r#"{"command":"setMode","value":3,"wifiBoxId":"0012AB","thermostatId":"4"}"#
                    .to_string()
            )]
        );
    }

    #[tokio::test]
    async fn set_temperature_waits_for_confirmation() {
        let (t, sink) = thermostat();
        t.handle_status_payload(r#"{"currentSetPoint":19.0}"#).unwrap();

        t.set_temperature(22.0).await.unwrap();

        assert_eq!(
            sink.published(),
            vec![(
                "besmart/command".to_string(),
                r#"{"command":"setComfortTemperature","value":22.0,"wifiBoxId":"0012AB","thermostatId":"4"}"#
                    .to_string()
            )]
        );
        assert_eq!(t.target_temperature(), 19.0);

        t.handle_status_payload(r#"{"currentSetPoint":22.0}"#).unwrap();
        assert_eq!(t.target_temperature(), 22.0);
    }

    #[tokio::test]
    async fn zero_temperature_is_not_sent() {
        let (t, sink) = thermostat();

        assert_eq!(t.set_temperature(0.0).await.unwrap(), None);
        assert!(sink.published().is_empty());

        assert!(t.set_temperature(0.2).await.unwrap().is_some());
        assert_eq!(sink.published().len(), 1);
    }

    #[tokio::test]
    async fn publish_failure_keeps_optimistic_preset() {
        let (t, sink) = thermostat();
        sink.fail.store(true, Ordering::SeqCst);

        let result = t.set_preset_mode("MANUAL").await;

        assert!(matches!(result, Err(Error::Protocol(_))));
        assert_eq!(t.preset_mode(), PresetMode::Manual);
        assert!(sink.published().is_empty());
    }

    #[tokio::test]
    async fn non_finite_temperature_is_not_sent() {
        let (t, sink) = thermostat();
        assert!(matches!(
            t.set_temperature(f64::INFINITY).await,
            Err(Error::Value(_))
        ));
        assert!(sink.published().is_empty());
    }

    #[tokio::test]
    async fn intent_notifies_once() {
        let (t, _) = thermostat();
        let presets = Arc::new(Mutex::new(Vec::new()));
        let updates = Arc::new(Mutex::new(0u32));
        let presets_clone = Arc::clone(&presets);
        let updates_clone = Arc::clone(&updates);

        t.on_preset_changed(move |p| presets_clone.lock().push(p));
        t.on_updated(move |_| *updates_clone.lock() += 1);

        t.set_preset_mode("DHW").await.unwrap();
        // Re-selecting the same preset changes nothing locally
        t.set_preset_mode("DHW").await.unwrap();

        assert_eq!(*presets.lock(), vec![PresetMode::Dhw]);
        assert_eq!(*updates.lock(), 1);
    }
}

mod concurrency {
    use super::*;

    /// Every status message writes the same value to all of these fields, so
    /// a torn write would show up as a snapshot where they disagree.
    fn assert_consistent(snapshot: &ThermostatSnapshot) {
        let v = snapshot.room_temperature();
        assert_eq!(snapshot.outside_temperature(), v);
        assert_eq!(snapshot.comfort_temperature(), v);
        assert_eq!(snapshot.economy_temperature(), v);
        assert_eq!(snapshot.current_setpoint(), v);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_merges_and_intents_never_tear() {
        let (t, sink) = thermostat();
        let mut handles = Vec::new();

        for writer in 0..4_u32 {
            let t = t.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..500_u32 {
                    let v = f64::from(writer * 1000 + i);
                    let payload = format!(
                        r#"{{"roomTemp":{v},"outSideTemp":{v},"comfortTemperature":{v},"economyTemperature":{v},"currentSetPoint":{v}}}"#
                    );
                    t.handle_status_payload(&payload).unwrap();
                    if i % 10 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }

        for _ in 0..2 {
            let t = t.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..200_usize {
                    let preset = PresetMode::ALL[i % PresetMode::ALL.len()];
                    t.set_preset(preset).await.unwrap();
                    t.set_hvac_mode(if i % 2 == 0 {
                        HvacMode::Cool
                    } else {
                        HvacMode::Heat
                    });
                }
            }));
        }

        {
            let t = t.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..2000 {
                    assert_consistent(&t.snapshot());
                    tokio::task::yield_now().await;
                }
            }));
        }

        let checker = t.clone();
        let last_seen = Arc::new(Mutex::new(None));
        let last_seen_clone = Arc::clone(&last_seen);
        t.on_updated(move |snapshot| {
            assert_consistent(snapshot);
            // Callbacks run outside the lock and may read the engine
            let _ = checker.current_temperature();
            *last_seen_clone.lock() = Some(snapshot.clone());
        });

        for handle in handles {
            handle.await.unwrap();
        }

        assert_consistent(&t.snapshot());
        // Deliveries are ordered, so the host ends on the engine's state
        if let Some(last) = last_seen.lock().as_ref() {
            assert_eq!(last, &t.snapshot());
        }
        assert_eq!(sink.published().len(), 400);
    }
}
