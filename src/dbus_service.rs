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

use std::path::PathBuf;

use zbus::{fdo, interface, ConnectionBuilder};

use crate::decision;
use crate::error::SleepError;
use crate::sleep_config::SleepOperation;

pub struct SleepCheckService {
    sleep_config: Option<PathBuf>,
}

#[interface(name = "io.github.rafaelrc7.SleepCheck")]
impl SleepCheckService {
    /// Answer feasibility of one of "suspend", "hibernate", "hybrid-sleep",
    /// "suspend-then-hibernate". Returns "yes", "no", or "na" when the
    /// operation is supported but swap is currently too small to hold a
    /// hibernation image.
    async fn can_sleep(&self, operation: &str) -> fdo::Result<String> {
        let operation: SleepOperation = operation.parse().map_err(fdo::Error::InvalidArgs)?;
        log::debug!("D-Bus method 'CanSleep' called for '{operation}'.");

        match decision::can_sleep(self.sleep_config.as_deref(), operation) {
            Ok(true) => Ok("yes".to_owned()),
            Ok(false) => Ok("no".to_owned()),
            Err(SleepError::SwapTooSmall) => Ok("na".to_owned()),
            Err(err) => Err(fdo::Error::Failed(err.to_string())),
        }
    }
}

pub async fn start_dbus_service(
    sleep_config: Option<PathBuf>,
) -> Result<zbus::Connection, zbus::Error> {
    let service = SleepCheckService { sleep_config };
    let connection = ConnectionBuilder::session()?
        .name("io.github.rafaelrc7.SleepCheck")?
        .serve_at("/io/github/rafaelrc7/SleepCheck", service)?
        .build()
        .await?;

    log::info!("D-Bus sleep feasibility service started successfully.");
    Ok(connection)
}
