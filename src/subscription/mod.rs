// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for thermostat state changes.
//!
//! A host binding registers callbacks on a
//! [`Thermostat`](crate::thermostat::Thermostat) to refresh its derived
//! views. Notifications are fire-and-forget: a thermostat with no
//! registered callbacks simply skips them, so status messages arriving
//! before the host attaches are merged silently.
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that stores callbacks and dispatches events
//! - [`Subscribable`] - Trait for types that support subscriptions

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
