// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Comfort temperature command.

use serde_json::Value;

use crate::command::Command;
use crate::error::ValueError;

/// Command to change the comfort temperature.
///
/// The value must be finite; the controller enforces its own setpoint bounds
/// and echoes the accepted value back in a later status message.
///
/// # Examples
///
/// ```
/// use besmart_bridge::command::{Command, SetComfortTemperatureCommand};
///
/// let cmd = SetComfortTemperatureCommand::new(22.0).unwrap();
/// assert_eq!(cmd.name(), "setComfortTemperature");
/// assert_eq!(cmd.value(), serde_json::json!(22.0));
///
/// assert!(SetComfortTemperatureCommand::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetComfortTemperatureCommand {
    temperature: f64,
}

impl SetComfortTemperatureCommand {
    /// Creates a command for the given temperature.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::NotFinite`] for NaN or infinite values.
    pub fn new(temperature: f64) -> Result<Self, ValueError> {
        if temperature.is_finite() {
            Ok(Self { temperature })
        } else {
            Err(ValueError::NotFinite(temperature))
        }
    }

    /// Returns the requested temperature.
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }
}

impl Command for SetComfortTemperatureCommand {
    fn name(&self) -> &'static str {
        "setComfortTemperature"
    }

    fn value(&self) -> Value {
        Value::from(self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite() {
        assert_eq!(
            SetComfortTemperatureCommand::new(f64::INFINITY),
            Err(ValueError::NotFinite(f64::INFINITY))
        );
        assert!(SetComfortTemperatureCommand::new(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn value_keeps_fraction() {
        let cmd = SetComfortTemperatureCommand::new(20.5).unwrap();
        assert_eq!(serde_json::to_string(&cmd.value()).unwrap(), "20.5");
    }
}
