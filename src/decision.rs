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

//! Feasibility decision engine. Reconciles the administrator's configuration,
//! the kernel's capability reporting and the host's resource preconditions
//! into one verdict per sleep operation: `Ok(true)`, `Ok(false)`, or an
//! error when the answer could not be determined.

use std::path::Path;

use crate::error::SleepError;
use crate::kernel_power::{self, KernelPower, SysPower};
use crate::resources::{HostResources, ProcResources};
use crate::sleep_config::{SleepConfig, SleepOperation};

/// Answer whether `operation` may be performed right now.
///
/// Loads a fresh configuration snapshot (from `config_path` if given), so
/// concurrent callers never share state and answers always reflect the
/// current configuration and kernel files. This is the only entry point the
/// outer layers use.
pub fn can_sleep(
    config_path: Option<&Path>,
    operation: SleepOperation,
) -> Result<bool, SleepError> {
    let config = SleepConfig::load(config_path)?;
    decide(&config, &SysPower, &ProcResources, operation, true)
}

/// Decide feasibility of `operation` against a loaded configuration
/// snapshot.
///
/// `enforce_allow` applies the administrator's allow flag and is only set at
/// the outermost call: the composite operation re-enters with it disabled,
/// because its sub-checks ask about kernel capability, not policy, of
/// suspend and hibernate.
pub fn decide(
    config: &SleepConfig,
    kernel: &impl KernelPower,
    resources: &impl HostResources,
    operation: SleepOperation,
    enforce_allow: bool,
) -> Result<bool, SleepError> {
    if enforce_allow && !config.allowed(operation) {
        log::debug!(target: "decision", "Sleep operation '{operation}' is disabled by configuration.");
        return Ok(false);
    }

    if operation == SleepOperation::SuspendThenHibernate {
        return decide_suspend_then_hibernate(config, kernel, resources);
    }

    if !probe_verdict(kernel_power::state_supported(
        kernel,
        config.states(operation),
    ))? {
        return Ok(false);
    }
    if !probe_verdict(kernel_power::mode_supported(
        kernel,
        config.modes(operation),
    ))? {
        return Ok(false);
    }

    if operation == SleepOperation::Suspend {
        return Ok(true);
    }

    // Hibernation-class operations additionally need somewhere to put the
    // image. Exhausted swap is actionable by the administrator, so it gets
    // its own error rather than the plain negative a kernel limitation gets.
    if !resources.enough_swap_for_hibernation() {
        return Err(SleepError::SwapTooSmall);
    }

    Ok(true)
}

/// Downgrade "feature absent" probe outcomes to a plain negative verdict.
/// Indeterminate faults (unreadable or corrupt pseudo-file contents) keep
/// propagating.
fn probe_verdict(result: Result<bool, SleepError>) -> Result<bool, SleepError> {
    match result {
        Err(SleepError::Unconfigured | SleepError::NotWritable(_)) => Ok(false),
        other => other,
    }
}

fn decide_suspend_then_hibernate(
    config: &SleepConfig,
    kernel: &impl KernelPower,
    resources: &impl HostResources,
) -> Result<bool, SleepError> {
    if !resources.clock_has_wake_alarm() {
        log::debug!(target: "decision", "CLOCK_BOOTTIME_ALARM is not supported.");
        return Ok(false);
    }

    for sub_operation in [SleepOperation::Suspend, SleepOperation::Hibernate] {
        match decide(config, kernel, resources, sub_operation, false) {
            Ok(true) => (),
            // Insufficient swap is as terminal as kernel non-support here;
            // any other failure is an indeterminate fault and must not be
            // collapsed into "no".
            Ok(false) | Err(SleepError::SwapTooSmall) => {
                log::debug!(target: "decision", "Unable to {sub_operation} system.");
                return Ok(false);
            }
            Err(err) => {
                log::debug!(target: "decision", "Failed to check if {sub_operation} is possible: {err}");
                return Err(err);
            }
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel_power::tests::{CorruptKernel, FakeKernel, NoDiskReads};
    use crate::kernel_power::PowerFile;

    struct FakeResources {
        swap: bool,
        wake_alarm: bool,
    }

    impl Default for FakeResources {
        fn default() -> Self {
            Self {
                swap: true,
                wake_alarm: true,
            }
        }
    }

    impl HostResources for FakeResources {
        fn enough_swap_for_hibernation(&self) -> bool {
            self.swap
        }

        fn clock_has_wake_alarm(&self) -> bool {
            self.wake_alarm
        }
    }

    /// Kernel that must never be consulted at all
    struct NoProbes;

    impl KernelPower for NoProbes {
        fn is_writable(&self, file: PowerFile) -> bool {
            panic!("writability of {} checked", file.path());
        }

        fn read_line(&self, file: PowerFile) -> Result<String, SleepError> {
            panic!("{} read", file.path());
        }
    }

    fn default_config() -> SleepConfig {
        SleepConfig::from_toml_str("").unwrap()
    }

    fn config_with_suspend_disallowed() -> SleepConfig {
        SleepConfig::from_toml_str(
            "[sleep]\nallow_suspend = false\nallow_suspend_then_hibernate = true\n",
        )
        .unwrap()
    }

    #[test]
    fn suspend_is_feasible_on_a_supporting_kernel() {
        let config = default_config();
        let kernel = FakeKernel::default();
        let resources = FakeResources::default();

        assert!(decide(&config, &kernel, &resources, SleepOperation::Suspend, true).unwrap());
    }

    #[test]
    fn suspend_ignores_swap() {
        let config = default_config();
        let kernel = FakeKernel::default();
        let resources = FakeResources {
            swap: false,
            ..FakeResources::default()
        };

        assert!(decide(&config, &kernel, &resources, SleepOperation::Suspend, true).unwrap());
    }

    #[test]
    fn hibernate_without_swap_is_resource_exhaustion() {
        let config = default_config();
        let kernel = FakeKernel::default();
        let resources = FakeResources {
            swap: false,
            ..FakeResources::default()
        };

        assert!(matches!(
            decide(&config, &kernel, &resources, SleepOperation::Hibernate, true),
            Err(SleepError::SwapTooSmall)
        ));
        assert!(matches!(
            decide(&config, &kernel, &resources, SleepOperation::HybridSleep, true),
            Err(SleepError::SwapTooSmall)
        ));
    }

    #[test]
    fn explicitly_empty_state_list_is_a_plain_no() {
        // The probe reports an empty state list as unconfigured; the engine
        // turns that into a negative verdict rather than an error.
        let config = SleepConfig::from_toml_str("[sleep]\nsuspend_state = []\n").unwrap();
        let kernel = FakeKernel::default();
        let resources = FakeResources::default();

        assert!(!decide(&config, &kernel, &resources, SleepOperation::Suspend, true).unwrap());
    }

    #[test]
    fn unsupported_state_is_a_plain_no() {
        let config = default_config();
        let kernel = FakeKernel {
            states: "disk",
            ..FakeKernel::default()
        };
        let resources = FakeResources::default();

        assert!(!decide(&config, &kernel, &resources, SleepOperation::Suspend, true).unwrap());
    }

    #[test]
    fn unwritable_state_file_is_a_plain_no() {
        let config = default_config();
        let kernel = FakeKernel {
            state_writable: false,
            ..FakeKernel::default()
        };
        let resources = FakeResources::default();

        assert!(!decide(&config, &kernel, &resources, SleepOperation::Suspend, true).unwrap());
        assert!(!decide(&config, &kernel, &resources, SleepOperation::Hibernate, true).unwrap());
    }

    #[test]
    fn corrupt_kernel_file_propagates_from_primitives() {
        let config = default_config();
        let resources = FakeResources::default();

        assert!(matches!(
            decide(&config, &CorruptKernel, &resources, SleepOperation::Suspend, true),
            Err(SleepError::Parse { .. })
        ));
    }

    #[test]
    fn suspend_with_no_modes_skips_the_disk_file() {
        // Default configuration leaves the suspend mode list empty; the disk
        // file must not even be opened then (NoDiskReads panics if it is).
        let config = default_config();
        let resources = FakeResources::default();

        assert!(decide(&config, &NoDiskReads, &resources, SleepOperation::Suspend, true).unwrap());
    }

    #[test]
    fn disallowed_operation_is_refused_before_any_probe() {
        let config = config_with_suspend_disallowed();
        let resources = FakeResources::default();

        assert!(!decide(&config, &NoProbes, &resources, SleepOperation::Suspend, true).unwrap());
    }

    #[test]
    fn allow_flags_are_skipped_for_composite_sub_checks() {
        // Suspend disallowed by policy, but suspend-then-hibernate was
        // explicitly allowed: the composite may still exercise suspend as an
        // internal step.
        let config = config_with_suspend_disallowed();
        let kernel = FakeKernel::default();
        let resources = FakeResources::default();

        assert!(decide(
            &config,
            &kernel,
            &resources,
            SleepOperation::SuspendThenHibernate,
            true
        )
        .unwrap());
    }

    #[test]
    fn composite_requires_a_wake_alarm() {
        let config = default_config();
        let kernel = FakeKernel::default();
        let resources = FakeResources {
            wake_alarm: false,
            ..FakeResources::default()
        };

        assert!(!decide(
            &config,
            &kernel,
            &resources,
            SleepOperation::SuspendThenHibernate,
            true
        )
        .unwrap());
    }

    #[test]
    fn composite_collapses_exhausted_swap_into_no() {
        let config = default_config();
        let kernel = FakeKernel::default();
        let resources = FakeResources {
            swap: false,
            ..FakeResources::default()
        };

        assert!(!decide(
            &config,
            &kernel,
            &resources,
            SleepOperation::SuspendThenHibernate,
            true
        )
        .unwrap());
    }

    #[test]
    fn composite_propagates_indeterminate_probe_faults() {
        let config = default_config();
        let resources = FakeResources::default();

        assert!(matches!(
            decide(
                &config,
                &CorruptKernel,
                &resources,
                SleepOperation::SuspendThenHibernate,
                true
            ),
            Err(SleepError::Parse { .. })
        ));
    }

    #[test]
    fn composite_is_no_when_a_leg_is_unsupported() {
        let config = default_config();
        // Kernel can suspend but not hibernate
        let kernel = FakeKernel {
            states: "freeze mem",
            ..FakeKernel::default()
        };
        let resources = FakeResources::default();

        assert!(!decide(
            &config,
            &kernel,
            &resources,
            SleepOperation::SuspendThenHibernate,
            true
        )
        .unwrap());
    }

    #[test]
    fn composite_is_yes_when_both_legs_pass() {
        let config = default_config();
        let kernel = FakeKernel::default();
        let resources = FakeResources::default();

        assert!(decide(
            &config,
            &kernel,
            &resources,
            SleepOperation::SuspendThenHibernate,
            true
        )
        .unwrap());
    }
}
