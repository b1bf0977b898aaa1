// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device work modes and their host-facing preset names.
//!
//! The controller reports its operating mode as an integer code (0-5). The
//! host sees the same six modes as named presets. The two enumerations map
//! one-to-one; the fallbacks for unknown values live at the edges:
//!
//! - an unknown device code reads as [`PresetMode::Idle`]
//! - an unknown preset name is sent as [`WorkMode::Auto`]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Operating mode as encoded by the controller.
///
/// # Examples
///
/// ```
/// use besmart_bridge::types::WorkMode;
///
/// assert_eq!(WorkMode::Party.code(), 3);
/// assert_eq!(WorkMode::from_code(5), Some(WorkMode::Dhw));
/// assert_eq!(WorkMode::from_code(99), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkMode {
    /// Follows the weekly program.
    Auto,
    /// Manual comfort temperature.
    Manual,
    /// Holiday / economy temperature.
    Economy,
    /// Party, comfort temperature until further notice.
    Party,
    /// Off, anti-frost protection only.
    #[default]
    Idle,
    /// Domestic hot water only.
    Dhw,
}

impl WorkMode {
    /// All work modes in device code order.
    pub const ALL: [Self; 6] = [
        Self::Auto,
        Self::Manual,
        Self::Economy,
        Self::Party,
        Self::Idle,
        Self::Dhw,
    ];

    /// Returns the integer code used on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Manual => 1,
            Self::Economy => 2,
            Self::Party => 3,
            Self::Idle => 4,
            Self::Dhw => 5,
        }
    }

    /// Looks up a work mode by its wire code.
    ///
    /// Returns `None` for codes the controller firmware is not known to send.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Auto),
            1 => Some(Self::Manual),
            2 => Some(Self::Economy),
            3 => Some(Self::Party),
            4 => Some(Self::Idle),
            5 => Some(Self::Dhw),
            _ => None,
        }
    }
}

impl TryFrom<i64> for WorkMode {
    type Error = ValueError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(ValueError::UnknownWorkMode(code))
    }
}

impl From<PresetMode> for WorkMode {
    fn from(preset: PresetMode) -> Self {
        match preset {
            PresetMode::Auto => Self::Auto,
            PresetMode::Manual => Self::Manual,
            PresetMode::Eco => Self::Economy,
            PresetMode::Party => Self::Party,
            PresetMode::Idle => Self::Idle,
            PresetMode::Dhw => Self::Dhw,
        }
    }
}

/// Preset name exposed to the home-automation host.
///
/// # Examples
///
/// ```
/// use besmart_bridge::types::PresetMode;
///
/// let preset: PresetMode = "ECO".parse().unwrap();
/// assert_eq!(preset, PresetMode::Eco);
/// assert_eq!(PresetMode::from_name_or_auto("BOOST"), PresetMode::Auto);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresetMode {
    /// `AUTO`
    Auto,
    /// `MANUAL`
    Manual,
    /// `ECO`
    Eco,
    /// `PARTY`
    Party,
    /// `IDLE`
    Idle,
    /// `DHW`
    Dhw,
}

impl PresetMode {
    /// The fixed preset list offered to the host, in device code order.
    pub const ALL: [Self; 6] = [
        Self::Auto,
        Self::Manual,
        Self::Eco,
        Self::Party,
        Self::Idle,
        Self::Dhw,
    ];

    /// Returns the preset name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Manual => "MANUAL",
            Self::Eco => "ECO",
            Self::Party => "PARTY",
            Self::Idle => "IDLE",
            Self::Dhw => "DHW",
        }
    }

    /// Resolves a raw device code, reading unknown codes as [`PresetMode::Idle`].
    #[must_use]
    pub fn from_code_or_idle(code: i64) -> Self {
        WorkMode::from_code(code).map_or(Self::Idle, Self::from)
    }

    /// Resolves a preset name, sending unknown names as [`PresetMode::Auto`].
    #[must_use]
    pub fn from_name_or_auto(name: &str) -> Self {
        name.parse().unwrap_or(Self::Auto)
    }
}

impl From<WorkMode> for PresetMode {
    fn from(mode: WorkMode) -> Self {
        match mode {
            WorkMode::Auto => Self::Auto,
            WorkMode::Manual => Self::Manual,
            WorkMode::Economy => Self::Eco,
            WorkMode::Party => Self::Party,
            WorkMode::Idle => Self::Idle,
            WorkMode::Dhw => Self::Dhw,
        }
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| ValueError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_mode_codes() {
        for (expected, mode) in WorkMode::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(mode.code()), expected);
            assert_eq!(WorkMode::from_code(i64::from(mode.code())), Some(mode));
        }
    }

    #[test]
    fn work_mode_rejects_unknown_codes() {
        assert_eq!(WorkMode::from_code(-1), None);
        assert_eq!(WorkMode::from_code(6), None);
        assert_eq!(
            WorkMode::try_from(99),
            Err(ValueError::UnknownWorkMode(99))
        );
    }

    #[test]
    fn default_work_mode_is_idle() {
        assert_eq!(WorkMode::default(), WorkMode::Idle);
    }

    #[test]
    fn preset_table_is_bijective() {
        for preset in PresetMode::ALL {
            assert_eq!(PresetMode::from(WorkMode::from(preset)), preset);
        }
        for mode in WorkMode::ALL {
            assert_eq!(WorkMode::from(PresetMode::from(mode)), mode);
        }
    }

    #[test]
    fn economy_is_called_eco() {
        assert_eq!(PresetMode::from(WorkMode::Economy).as_str(), "ECO");
        assert_eq!(WorkMode::from(PresetMode::Eco).code(), 2);
    }

    #[test]
    fn preset_from_str_is_exact() {
        assert_eq!("PARTY".parse::<PresetMode>().unwrap(), PresetMode::Party);
        assert!(matches!(
            "party".parse::<PresetMode>(),
            Err(ValueError::UnknownPreset(_))
        ));
    }

    #[test]
    fn unknown_code_reads_as_idle() {
        assert_eq!(PresetMode::from_code_or_idle(99), PresetMode::Idle);
        assert_eq!(PresetMode::from_code_or_idle(-3), PresetMode::Idle);
        assert_eq!(PresetMode::from_code_or_idle(0), PresetMode::Auto);
    }

    #[test]
    fn unknown_name_sends_auto() {
        assert_eq!(
            PresetMode::from_name_or_auto("unknown-value"),
            PresetMode::Auto
        );
        assert_eq!(PresetMode::from_name_or_auto("DHW"), PresetMode::Dhw);
    }

    #[test]
    fn preset_serializes_uppercase() {
        let json = serde_json::to_string(&PresetMode::Eco).unwrap();
        assert_eq!(json, "\"ECO\"");
    }
}
