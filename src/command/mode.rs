// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Work mode command.

use serde_json::Value;

use crate::command::Command;
use crate::types::{PresetMode, WorkMode};

/// Command to switch the controller to another work mode.
///
/// # Examples
///
/// ```
/// use besmart_bridge::command::{Command, SetModeCommand};
/// use besmart_bridge::types::WorkMode;
///
/// let cmd = SetModeCommand::new(WorkMode::Party);
/// assert_eq!(cmd.name(), "setMode");
/// assert_eq!(cmd.value(), serde_json::json!(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetModeCommand {
    mode: WorkMode,
}

impl SetModeCommand {
    /// Creates a command for the given work mode.
    #[must_use]
    pub const fn new(mode: WorkMode) -> Self {
        Self { mode }
    }

    /// Creates a command for a host preset.
    #[must_use]
    pub fn from_preset(preset: PresetMode) -> Self {
        Self::new(WorkMode::from(preset))
    }

    /// Returns the requested work mode.
    #[must_use]
    pub const fn mode(&self) -> WorkMode {
        self.mode
    }
}

impl Command for SetModeCommand {
    fn name(&self) -> &'static str {
        "setMode"
    }

    fn value(&self) -> Value {
        Value::from(self.mode.code())
    }
}
