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

//! Check which low-power sleep operations (suspend, hibernate, hybrid-sleep,
//! suspend-then-hibernate) this host can perform right now, reconciling the
//! administrator's configuration with the kernel's capability reporting and
//! the host's swap and wake-alarm preconditions

use std::{
    error::Error,
    path::Path,
    process::ExitCode,
    sync::{
        atomic::{self, AtomicBool},
        Arc,
    },
    time::Duration,
};

mod dbus_service;
mod decision;
mod error;
mod kernel_power;
mod resources;
mod settings;
mod sleep_config;

use error::SleepError;
use settings::Settings;
use sleep_config::{SleepConfig, SleepOperation};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            log::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn Error>> {
    let settings = Settings::new()?;

    simplelog::TermLogger::init(
        settings.get_verbosity(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if settings.is_serve_enabled() {
        return serve(&settings).await;
    }

    match settings.get_operation() {
        Some(operation) => query_one(&settings, operation),
        None => query_all(&settings),
    }
}

/// Serve feasibility queries on the session bus until terminated
async fn serve(settings: &Settings) -> Result<ExitCode, Box<dyn Error>> {
    let _connection = dbus_service::start_dbus_service(
        settings.get_sleep_config_path().map(Path::to_path_buf),
    )
    .await?;

    let term = Arc::new(AtomicBool::new(false));
    for sig in signal_hook::consts::TERM_SIGNALS {
        signal_hook::flag::register(*sig, Arc::clone(&term))?;
    }

    while !term.load(atomic::Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    Ok(ExitCode::SUCCESS)
}

/// One-shot query: print the verdict, exit 0 when feasible and 1 when not
fn query_one(settings: &Settings, operation: SleepOperation) -> Result<ExitCode, Box<dyn Error>> {
    let (feasible, reason) =
        match decision::can_sleep(settings.get_sleep_config_path(), operation) {
            Ok(feasible) => (feasible, None),
            Err(SleepError::SwapTooSmall) => {
                (false, Some("not enough swap space for hibernation"))
            }
            Err(err) => return Err(err.into()),
        };

    let verdict = if feasible { "yes" } else { "no" };
    if settings.is_json_enabled() {
        match reason {
            Some(reason) => println!(
                "{{\"operation\":\"{operation}\", \"verdict\":\"{verdict}\", \"reason\":\"{reason}\"}}"
            ),
            None => println!("{{\"operation\":\"{operation}\", \"verdict\":\"{verdict}\"}}"),
        }
    } else {
        match reason {
            Some(reason) => println!("{verdict}: {reason}"),
            None => println!("{verdict}"),
        }
    }

    Ok(if feasible {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Report all four operations plus the configured timings, the set a session
/// manager would advertise to its clients
fn query_all(settings: &Settings) -> Result<ExitCode, Box<dyn Error>> {
    let config = SleepConfig::load(settings.get_sleep_config_path())?;

    let mut verdicts = Vec::with_capacity(SleepOperation::ALL.len());
    for operation in SleepOperation::ALL {
        verdicts.push((
            operation,
            verdict_label(decision::can_sleep(
                settings.get_sleep_config_path(),
                operation,
            ))?,
        ));
    }

    if settings.is_json_enabled() {
        let fields: Vec<String> = verdicts
            .iter()
            .map(|(operation, verdict)| format!("\"{operation}\":\"{verdict}\""))
            .collect();
        let delay = match config.hibernate_delay() {
            Some(delay) => delay.as_secs().to_string(),
            None => "null".to_owned(),
        };
        println!(
            "{{{}, \"hibernate_delay_sec\":{delay}, \"suspend_estimation_sec\":{}}}",
            fields.join(", "),
            config.suspend_estimation().as_secs()
        );
    } else {
        for (operation, verdict) in &verdicts {
            println!("{operation}: {verdict}");
        }
        match config.hibernate_delay() {
            Some(delay) => println!("hibernate delay: {}s", delay.as_secs()),
            None => println!("hibernate delay: none"),
        }
        println!(
            "suspend estimation: {}s",
            config.suspend_estimation().as_secs()
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// "yes"/"no" for definite verdicts, "na" when the only obstacle is swap that
/// is currently too small; indeterminate probe faults stay errors
fn verdict_label(result: Result<bool, SleepError>) -> Result<&'static str, SleepError> {
    match result {
        Ok(true) => Ok("yes"),
        Ok(false) => Ok("no"),
        Err(SleepError::SwapTooSmall) => Ok("na"),
        Err(err) => Err(err),
    }
}
