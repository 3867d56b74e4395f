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

//! Error type shared by the feasibility engine and its probes

use std::io;

use thiserror::Error;

/// Everything that can go wrong while answering "can this host sleep?".
///
/// [SleepError::Unconfigured] and [SleepError::NotWritable] are expected
/// conditions (a container without `/sys/power`, an operation configured
/// away) and are turned into a plain negative verdict inside the decision
/// engine. [SleepError::Parse] and [SleepError::Io] are indeterminate probe
/// faults and always reach the caller.
#[derive(Debug, Error)]
pub enum SleepError {
    #[error("no sleep state configured")]
    Unconfigured,

    #[error("{0} is not writable")]
    NotWritable(&'static str),

    #[error("failed to parse {file}: {reason}")]
    Parse { file: &'static str, reason: String },

    #[error("not enough swap space for hibernation")]
    SwapTooSmall,

    #[error("failed to load sleep configuration: {0}")]
    Config(#[from] figment::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
