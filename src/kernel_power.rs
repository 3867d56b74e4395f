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

//! Capability probe against the kernel's power control files. The kernel
//! reports what it supports as a single whitespace-separated line, and
//! reports writability of the control file itself as the signal for whether
//! the feature exists at all on this build.

use std::fs;

use nix::unistd::{access, AccessFlags};

use crate::error::SleepError;

pub const SYSFS_STATE_PATH: &str = "/sys/power/state";
pub const SYSFS_DISK_PATH: &str = "/sys/power/disk";

/// The two kernel pseudo-files consulted by the probe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerFile {
    /// Supported sleep states (`/sys/power/state`)
    State,
    /// Supported hibernation disk modes (`/sys/power/disk`)
    Disk,
}

impl PowerFile {
    pub fn path(self) -> &'static str {
        match self {
            PowerFile::State => SYSFS_STATE_PATH,
            PowerFile::Disk => SYSFS_DISK_PATH,
        }
    }
}

/// Access to the kernel power control files, a seam so the decision engine
/// can be exercised without a real `/sys/power`.
pub trait KernelPower {
    /// Whether this process may write the control file. Non-writable means
    /// the feature is absent on this kernel, not a transient fault.
    fn is_writable(&self, file: PowerFile) -> bool;

    /// Read the single line the kernel exposes in `file`
    fn read_line(&self, file: PowerFile) -> Result<String, SleepError>;
}

/// The real sysfs-backed implementation
pub struct SysPower;

impl KernelPower for SysPower {
    fn is_writable(&self, file: PowerFile) -> bool {
        access(file.path(), AccessFlags::W_OK).is_ok()
    }

    fn read_line(&self, file: PowerFile) -> Result<String, SleepError> {
        let raw = fs::read(file.path())?;
        let contents = String::from_utf8(raw).map_err(|err| SleepError::Parse {
            file: file.path(),
            reason: err.to_string(),
        })?;
        Ok(contents.lines().next().unwrap_or_default().to_owned())
    }
}

/// Check whether the kernel supports any of the configured sleep states.
///
/// A state is mandatory for every primitive operation, so an empty candidate
/// list is reported as [SleepError::Unconfigured] rather than a negative
/// verdict.
pub fn state_supported(
    kernel: &impl KernelPower,
    states: &[String],
) -> Result<bool, SleepError> {
    if states.is_empty() {
        log::debug!(target: "kernel_power", "No sleep state configured.");
        return Err(SleepError::Unconfigured);
    }

    if !kernel.is_writable(PowerFile::State) {
        log::debug!(target: "kernel_power", "{SYSFS_STATE_PATH} is not writable.");
        return Err(SleepError::NotWritable(SYSFS_STATE_PATH));
    }

    let supported = kernel.read_line(PowerFile::State)?;
    for word in supported.split_whitespace() {
        if states.iter().any(|state| state == word) {
            log::debug!(target: "kernel_power", "Sleep state '{word}' is supported by kernel.");
            return Ok(true);
        }
    }

    log::debug!(
        target: "kernel_power",
        "None of the configured sleep states are supported by kernel: {}",
        states.join(" ")
    );
    Ok(false)
}

/// Check whether the kernel supports any of the configured hibernation disk
/// modes.
///
/// Unlike the state check, an empty candidate list is fine: the kernel has
/// its own default disk mode, so nothing is probed at all in that case. The
/// currently selected kernel mode is reported wrapped in brackets (e.g.
/// `[platform]`) and is compared with exactly one bracket pair stripped.
pub fn mode_supported(kernel: &impl KernelPower, modes: &[String]) -> Result<bool, SleepError> {
    if modes.is_empty() {
        log::debug!(target: "kernel_power", "No sleep mode configured, using kernel default.");
        return Ok(true);
    }

    if !kernel.is_writable(PowerFile::Disk) {
        log::debug!(target: "kernel_power", "{SYSFS_DISK_PATH} is not writable.");
        return Err(SleepError::NotWritable(SYSFS_DISK_PATH));
    }

    let supported = kernel.read_line(PowerFile::Disk)?;
    for word in supported.split_whitespace() {
        let mode = word
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
            .unwrap_or(word);

        if modes.iter().any(|candidate| candidate == mode) {
            log::debug!(target: "kernel_power", "Disk sleep mode '{mode}' is supported by kernel.");
            return Ok(true);
        }
    }

    log::debug!(
        target: "kernel_power",
        "None of the configured hibernation power modes are supported by kernel: {}",
        modes.join(" ")
    );
    Ok(false)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Fake kernel with fixed file contents
    pub struct FakeKernel {
        pub states: &'static str,
        pub disk: &'static str,
        pub state_writable: bool,
        pub disk_writable: bool,
    }

    impl Default for FakeKernel {
        fn default() -> Self {
            Self {
                states: "freeze mem disk",
                disk: "[platform] shutdown reboot suspend",
                state_writable: true,
                disk_writable: true,
            }
        }
    }

    impl KernelPower for FakeKernel {
        fn is_writable(&self, file: PowerFile) -> bool {
            match file {
                PowerFile::State => self.state_writable,
                PowerFile::Disk => self.disk_writable,
            }
        }

        fn read_line(&self, file: PowerFile) -> Result<String, SleepError> {
            match file {
                PowerFile::State => Ok(self.states.to_owned()),
                PowerFile::Disk => Ok(self.disk.to_owned()),
            }
        }
    }

    /// Fake kernel whose disk file must never be touched
    pub struct NoDiskReads;

    impl KernelPower for NoDiskReads {
        fn is_writable(&self, file: PowerFile) -> bool {
            match file {
                PowerFile::State => true,
                PowerFile::Disk => panic!("disk writability checked"),
            }
        }

        fn read_line(&self, file: PowerFile) -> Result<String, SleepError> {
            match file {
                PowerFile::State => Ok("freeze mem disk".to_owned()),
                PowerFile::Disk => panic!("disk file read"),
            }
        }
    }

    /// Fake kernel that fails every read with a parse error
    pub struct CorruptKernel;

    impl KernelPower for CorruptKernel {
        fn is_writable(&self, _file: PowerFile) -> bool {
            true
        }

        fn read_line(&self, file: PowerFile) -> Result<String, SleepError> {
            Err(SleepError::Parse {
                file: file.path(),
                reason: "invalid utf-8 sequence".to_owned(),
            })
        }
    }

    fn strv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| (*t).to_owned()).collect()
    }

    #[test]
    fn state_match_is_order_independent() {
        let kernel = FakeKernel::default();

        assert!(state_supported(&kernel, &strv(&["mem", "standby"])).unwrap());
        assert!(state_supported(&kernel, &strv(&["standby", "mem"])).unwrap());
        assert!(state_supported(&kernel, &strv(&["freeze"])).unwrap());
        assert!(!state_supported(&kernel, &strv(&["standby"])).unwrap());
    }

    #[test]
    fn empty_state_list_is_unconfigured() {
        let kernel = FakeKernel::default();

        assert!(matches!(
            state_supported(&kernel, &[]),
            Err(SleepError::Unconfigured)
        ));
    }

    #[test]
    fn unwritable_state_file_means_feature_absent() {
        let kernel = FakeKernel {
            state_writable: false,
            ..FakeKernel::default()
        };

        assert!(matches!(
            state_supported(&kernel, &strv(&["mem"])),
            Err(SleepError::NotWritable(SYSFS_STATE_PATH))
        ));
    }

    #[test]
    fn mode_match_strips_selected_brackets() {
        let kernel = FakeKernel::default();

        // "[platform]" in the kernel list matches a bare "platform"
        assert!(mode_supported(&kernel, &strv(&["platform"])).unwrap());
        // unbracketed tokens match as-is
        assert!(mode_supported(&kernel, &strv(&["shutdown"])).unwrap());
        assert!(!mode_supported(&kernel, &strv(&["test_resume"])).unwrap());
    }

    #[test]
    fn half_bracketed_mode_is_compared_literally() {
        let kernel = FakeKernel {
            disk: "[platform shutdown]",
            ..FakeKernel::default()
        };

        assert!(!mode_supported(&kernel, &strv(&["platform", "shutdown"])).unwrap());
        assert!(mode_supported(&kernel, &strv(&["[platform"])).unwrap());
        assert!(mode_supported(&kernel, &strv(&["shutdown]"])).unwrap());
    }

    #[test]
    fn mode_verdict_ignores_candidate_order() {
        let kernel = FakeKernel::default();

        assert!(mode_supported(&kernel, &strv(&["reboot", "platform"])).unwrap());
        assert!(mode_supported(&kernel, &strv(&["platform", "reboot"])).unwrap());
    }

    #[test]
    fn empty_mode_list_never_touches_the_disk_file() {
        assert!(mode_supported(&NoDiskReads, &[]).unwrap());
    }

    #[test]
    fn unwritable_disk_file_means_feature_absent() {
        let kernel = FakeKernel {
            disk_writable: false,
            ..FakeKernel::default()
        };

        assert!(matches!(
            mode_supported(&kernel, &strv(&["platform"])),
            Err(SleepError::NotWritable(SYSFS_DISK_PATH))
        ));
    }

    #[test]
    fn corrupt_contents_propagate_as_parse_errors() {
        assert!(matches!(
            state_supported(&CorruptKernel, &strv(&["mem"])),
            Err(SleepError::Parse { .. })
        ));
        assert!(matches!(
            mode_supported(&CorruptKernel, &strv(&["platform"])),
            Err(SleepError::Parse { .. })
        ));
    }
}
