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
//
// SPDX-License-Identifier: GPL-3.0-only

//! CLI Args parsing and processing

use std::{fmt::Display, path::PathBuf};

use clap::{builder::PossibleValue, Parser, ValueEnum};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::sleep_config::SleepOperation;

/// Struct used to derive, parse and serialise CLI args. Some of the fields will not be used by the
/// application and are only relevant in the context of CLI arguments, and thus have their
/// serialisation skipped.
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about)]
pub struct Args {
    #[arg(
        value_enum,
        value_name = "OPERATION",
        help = "Sleep operation to check; all four are reported when omitted"
    )]
    #[serde(skip_serializing)]
    pub operation: Option<SleepOperation>,

    #[arg(
        short,
        long,
        default_value_if("quiet", true.to_string(), LogLevel(LevelFilter::Off).to_string()),
        help="Log verbosity"
    )]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    verbosity: Option<LogLevel>,

    #[arg(
        short,
        long,
        conflicts_with = "verbosity",
        help = "Disables logging completely"
    )]
    #[serde(skip_serializing)]
    #[serde(default)]
    quiet: bool,

    #[arg(short, long, help = "Print verdicts as JSON")]
    json: bool,

    #[arg(
        long,
        help = "Serve feasibility queries on the session D-Bus instead of answering once"
    )]
    serve: bool,

    #[arg(
        short = 's',
        long,
        value_name = "PATH",
        help = "Path to the system sleep configuration file"
    )]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    sleep_config: Option<PathBuf>,

    #[arg(short, long, value_name = "PATH", help = "Path to config file")]
    #[serde(skip_serializing)]
    pub config: Option<String>,
}

/// Wrapper type around [LevelFilter] to implement the trait [ValueEnum] for better CLI args
/// integration
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogLevel(LevelFilter);

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ValueEnum for LogLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self(LevelFilter::Off),
            Self(LevelFilter::Error),
            Self(LevelFilter::Warn),
            Self(LevelFilter::Info),
            Self(LevelFilter::Debug),
            Self(LevelFilter::Trace),
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.0.to_string()))
    }
}
