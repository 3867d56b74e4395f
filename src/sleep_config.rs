// Copyright (C) 2025-2026  Rafael Carvalho <contact@rafaelrc.com>

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License version 3 as published by
// the Free Software Foundation.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot of the administrator's sleep configuration. A snapshot is loaded
//! fresh for every feasibility query, read once and discarded, so answers
//! always reflect the current file contents.

use std::{fmt::Display, path::Path, str::FromStr, time::Duration};

use clap::ValueEnum;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::SleepError;

/// System-wide sleep configuration file, read unless overridden on the CLI
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sleepcheck/sleep.toml";

/// Assumed suspend duration when the administrator did not estimate one
pub const DEFAULT_SUSPEND_ESTIMATION: Duration = Duration::from_secs(60 * 60);

/// A low-power transition the host may be asked to perform.
///
/// The first three are primitive and carry their own state/mode lists;
/// suspend-then-hibernate is composite and derives its feasibility from
/// [SleepOperation::Suspend] and [SleepOperation::Hibernate].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SleepOperation {
    Suspend,
    Hibernate,
    HybridSleep,
    SuspendThenHibernate,
}

impl SleepOperation {
    pub const ALL: [SleepOperation; 4] = [
        SleepOperation::Suspend,
        SleepOperation::Hibernate,
        SleepOperation::HybridSleep,
        SleepOperation::SuspendThenHibernate,
    ];

    fn index(self) -> usize {
        match self {
            SleepOperation::Suspend => 0,
            SleepOperation::Hibernate => 1,
            SleepOperation::HybridSleep => 2,
            SleepOperation::SuspendThenHibernate => 3,
        }
    }

    /// Slot in the per-operation state/mode tables. The composite operation
    /// has no lists of its own.
    fn config_slot(self) -> Option<usize> {
        match self {
            SleepOperation::SuspendThenHibernate => None,
            primitive => Some(primitive.index()),
        }
    }
}

impl Display for SleepOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SleepOperation::Suspend => "suspend",
            SleepOperation::Hibernate => "hibernate",
            SleepOperation::HybridSleep => "hybrid-sleep",
            SleepOperation::SuspendThenHibernate => "suspend-then-hibernate",
        })
    }
}

impl FromStr for SleepOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suspend" => Ok(SleepOperation::Suspend),
            "hibernate" => Ok(SleepOperation::Hibernate),
            "hybrid-sleep" => Ok(SleepOperation::HybridSleep),
            "suspend-then-hibernate" => Ok(SleepOperation::SuspendThenHibernate),
            _ => Err(format!("unknown sleep operation: {s}")),
        }
    }
}

/// Raw `[sleep]` section as it appears on disk. Allow flags are tristate:
/// absent means "derive a default", which a plain bool could not express.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SleepSection {
    allow_suspend: Option<bool>,
    allow_hibernation: Option<bool>,
    allow_hybrid_sleep: Option<bool>,
    allow_suspend_then_hibernate: Option<bool>,

    suspend_state: Option<Vec<String>>,
    suspend_mode: Option<Vec<String>>,
    hibernate_state: Option<Vec<String>>,
    hibernate_mode: Option<Vec<String>>,
    hybrid_sleep_state: Option<Vec<String>>,
    hybrid_sleep_mode: Option<Vec<String>>,

    hibernate_delay_sec: Option<u64>,
    suspend_estimation_sec: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SleepToml {
    sleep: SleepSection,
}

/// Immutable per-query snapshot with all defaults applied. Unset state lists
/// fall back to built-in defaults, so they are non-empty unless the
/// administrator explicitly emptied one; mode lists may legitimately stay
/// empty, in which case the kernel's own default disk mode is trusted.
#[derive(Debug)]
pub struct SleepConfig {
    allow: [bool; 4],
    states: [Vec<String>; 3],
    modes: [Vec<String>; 3],
    hibernate_delay: Option<Duration>,
    suspend_estimation: Duration,
}

impl SleepConfig {
    /// Load a fresh snapshot from `path`, or from [DEFAULT_CONFIG_PATH] if
    /// no override was given. A missing file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SleepError> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        let raw: SleepToml = Figment::new().merge(Toml::file(path)).extract()?;
        Ok(Self::from_section(raw.sleep))
    }

    /// Build a snapshot from literal TOML, for tests
    #[cfg(test)]
    pub fn from_toml_str(toml: &str) -> Result<Self, SleepError> {
        let raw: SleepToml = Figment::new().merge(Toml::string(toml)).extract()?;
        Ok(Self::from_section(raw.sleep))
    }

    fn from_section(raw: SleepSection) -> Self {
        // Unset allow flags mean allowed; the hybrid operations inherit from
        // the resolved suspend and hibernate flags unless set explicitly.
        let allow_suspend = raw.allow_suspend.unwrap_or(true);
        let allow_hibernate = raw.allow_hibernation.unwrap_or(true);
        let allow_hybrid_sleep = raw
            .allow_hybrid_sleep
            .unwrap_or(allow_suspend && allow_hibernate);
        let allow_s2h = raw
            .allow_suspend_then_hibernate
            .unwrap_or(allow_suspend && allow_hibernate);

        Self {
            allow: [allow_suspend, allow_hibernate, allow_hybrid_sleep, allow_s2h],
            states: [
                or_default(raw.suspend_state, &["mem", "standby", "freeze"]),
                or_default(raw.hibernate_state, &["disk"]),
                or_default(raw.hybrid_sleep_state, &["disk"]),
            ],
            modes: [
                raw.suspend_mode.unwrap_or_default(),
                or_default(raw.hibernate_mode, &["platform", "shutdown"]),
                or_default(raw.hybrid_sleep_mode, &["suspend", "platform", "shutdown"]),
            ],
            hibernate_delay: raw.hibernate_delay_sec.map(Duration::from_secs),
            suspend_estimation: match raw.suspend_estimation_sec {
                None | Some(0) => DEFAULT_SUSPEND_ESTIMATION,
                Some(secs) => Duration::from_secs(secs),
            },
        }
    }

    /// Whether the administrator allows `operation` at all
    pub fn allowed(&self, operation: SleepOperation) -> bool {
        self.allow[operation.index()]
    }

    /// Configured kernel state tokens for a primitive operation
    pub fn states(&self, operation: SleepOperation) -> &[String] {
        operation
            .config_slot()
            .map_or(&[][..], |slot| &self.states[slot])
    }

    /// Configured hibernation disk-mode tokens for a primitive operation
    pub fn modes(&self, operation: SleepOperation) -> &[String] {
        operation
            .config_slot()
            .map_or(&[][..], |slot| &self.modes[slot])
    }

    /// Delay before the hibernate leg of suspend-then-hibernate fires.
    /// [None] means no fixed delay was configured.
    pub fn hibernate_delay(&self) -> Option<Duration> {
        self.hibernate_delay
    }

    /// Estimated duration of a suspend leg, used to size wake-up timers
    pub fn suspend_estimation(&self) -> Duration {
        self.suspend_estimation
    }
}

// Defaults apply only when the administrator left the field unset; an
// explicitly empty list stays empty.
fn or_default(configured: Option<Vec<String>>, default: &[&str]) -> Vec<String> {
    configured.unwrap_or_else(|| default.iter().map(|s| (*s).to_owned()).collect())
}
