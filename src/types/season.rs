// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heating season and the host HVAC mode derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Season setting of the controller, encoded on the wire as `"1"` / `"0"`.
///
/// # Examples
///
/// ```
/// use besmart_bridge::types::Season;
///
/// assert_eq!(Season::Heat.as_wire(), "1");
/// assert_eq!(Season::from_wire("0"), Some(Season::Cool));
/// assert_eq!(Season::from_wire("2"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Season {
    /// Winter, heating.
    #[default]
    Heat,
    /// Summer, cooling.
    Cool,
}

impl Season {
    /// Returns the wire encoding.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Heat => "1",
            Self::Cool => "0",
        }
    }

    /// Decodes the wire encoding.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::Heat),
            "0" => Some(Self::Cool),
            _ => None,
        }
    }
}

impl From<HvacMode> for Season {
    fn from(mode: HvacMode) -> Self {
        match mode {
            HvacMode::Heat => Self::Heat,
            HvacMode::Cool => Self::Cool,
        }
    }
}

/// HVAC mode exposed to the host. There is no `off` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    /// `heat`
    Heat,
    /// `cool`
    Cool,
}

impl HvacMode {
    /// Modes offered to the host.
    pub const ALL: [Self; 2] = [Self::Cool, Self::Heat];

    /// Returns the host mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heat => "heat",
            Self::Cool => "cool",
        }
    }
}

impl From<Season> for HvacMode {
    fn from(season: Season) -> Self {
        match season {
            Season::Heat => Self::Heat,
            Season::Cool => Self::Cool,
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            _ => Err(ValueError::UnknownHvacMode(s.to_string())),
        }
    }
}

/// What the heating element is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacAction {
    /// Element active in heat mode.
    Heating,
    /// Element active in cool mode.
    Cooling,
    /// Element inactive.
    Off,
}

impl HvacAction {
    /// Derives the action from the heating flag and the current mode.
    #[must_use]
    pub const fn derive(heating: bool, mode: HvacMode) -> Self {
        match (heating, mode) {
            (true, HvacMode::Heat) => Self::Heating,
            (true, HvacMode::Cool) => Self::Cooling,
            (false, _) => Self::Off,
        }
    }
}
