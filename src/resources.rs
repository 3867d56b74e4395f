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

//! Resource preconditions for hibernation-class operations: enough swap to
//! hold a memory image, and a hardware alarm clock able to wake the host for
//! the hibernate leg of suspend-then-hibernate.

use std::fs;

use nix::time::{clock_getres, ClockId};

const PROC_MEMINFO_PATH: &str = "/proc/meminfo";

/// Share of free swap considered actually usable for a hibernation image
const SWAP_USABLE_PERCENT: u64 = 98;

/// Host resource oracles consulted by the decision engine
pub trait HostResources {
    /// Whether free swap can hold a memory image of the current working set
    fn enough_swap_for_hibernation(&self) -> bool;

    /// Whether a boot-time hardware alarm clock is available to schedule the
    /// hibernate leg of a suspend-then-hibernate sequence
    fn clock_has_wake_alarm(&self) -> bool;
}

/// The real procfs/clock-backed implementation
pub struct ProcResources;

impl HostResources for ProcResources {
    fn enough_swap_for_hibernation(&self) -> bool {
        let meminfo = match fs::read_to_string(PROC_MEMINFO_PATH) {
            Ok(contents) => contents,
            Err(err) => {
                log::debug!(target: "resources", "Failed to read {PROC_MEMINFO_PATH}: {err}");
                return false;
            }
        };

        match swap_can_hold_image(&meminfo) {
            Some(enough) => enough,
            None => {
                log::debug!(target: "resources", "Incomplete {PROC_MEMINFO_PATH}, assuming swap is insufficient.");
                false
            }
        }
    }

    fn clock_has_wake_alarm(&self) -> bool {
        clock_getres(ClockId::CLOCK_BOOTTIME_ALARM).is_ok()
    }
}

/// Compare free swap against the anonymous working set that a hibernation
/// image would have to hold. Values are the kB counters from `/proc/meminfo`.
fn swap_can_hold_image(meminfo: &str) -> Option<bool> {
    let swap_free = meminfo_field(meminfo, "SwapFree:")?;
    let active_anon = meminfo_field(meminfo, "Active(anon):")?;

    let usable = swap_free * SWAP_USABLE_PERCENT / 100;
    log::debug!(
        target: "resources",
        "Swap free: {swap_free} kB ({usable} kB usable), anonymous working set: {active_anon} kB."
    );
    Some(usable >= active_anon)
}

fn meminfo_field(meminfo: &str, field: &str) -> Option<u64> {
    meminfo
        .lines()
        .find(|line| line.starts_with(field))?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()
}
