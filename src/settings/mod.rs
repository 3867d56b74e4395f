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

//! Module responsible with the tool's configuration

use std::{
    error::Error,
    path::{Path, PathBuf},
};

use clap::Parser;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use log::LevelFilter;
use serde::Deserialize;

use crate::sleep_config::SleepOperation;

mod cli;
use cli::Args;

/// Struct that stores the settings that affect the tool behaviour
#[derive(Deserialize)]
pub struct Settings {
    #[serde(default = "default_verbosity")]
    verbosity: LevelFilter,

    #[serde(default)]
    sleep_config: Option<PathBuf>,

    #[serde(default)]
    serve: bool,

    #[serde(default)]
    json: bool,

    #[serde(skip)]
    operation: Option<SleepOperation>,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let cli = Args::parse();

        let config_path = match cli.config {
            Some(ref p) => PathBuf::from(p),
            None => xdg::BaseDirectories::with_prefix(env!("CARGO_PKG_NAME"))?
                .place_config_file("config.toml")?,
        };

        let operation = cli.operation;

        let mut settings: Settings = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Serialized::defaults(cli))
            .extract()?;
        settings.operation = operation;

        Ok(settings)
    }

    /// Returns the current log verbosity
    pub fn get_verbosity(&self) -> LevelFilter {
        self.verbosity
    }

    /// Sleep operation given on the command line, if any
    pub fn get_operation(&self) -> Option<SleepOperation> {
        self.operation
    }

    /// Override for the system sleep configuration file
    pub fn get_sleep_config_path(&self) -> Option<&Path> {
        self.sleep_config.as_deref()
    }

    pub fn is_serve_enabled(&self) -> bool {
        self.serve
    }

    pub fn is_json_enabled(&self) -> bool {
        self.json
    }
}

/// Default log verbosity, set to [LevelFilter::Warn]
fn default_verbosity() -> LevelFilter {
    LevelFilter::Warn
}
