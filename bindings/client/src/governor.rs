use crate::device::AdbDevice;

/// CPU frequency policy to apply to every core of the device before measuring.
///
/// Locking needs a `userspace` governor, which is only writable on rooted or userdebug builds. The
/// scripts are run unchecked so that a locked-down device still gets measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuGovernor {
    /// Pin every core to its minimum frequency.
    LockMin,
    /// Pin every core to its maximum frequency.
    LockMax,
    /// Hand frequency control back to the kernel's dynamic governor.
    Unlock,
}

impl CpuGovernor {
    /// The device shell script that applies this policy.
    pub fn script(self) -> &'static str {
        match self {
            CpuGovernor::LockMin => {
                r#"
        for x in /sys/devices/system/cpu/cpu?/cpufreq; do
            echo userspace > $x/scaling_governor
            cat $x/scaling_min_freq > $x/scaling_setspeed
        done
    "#
            }
            CpuGovernor::LockMax => {
                r#"
        for x in /sys/devices/system/cpu/cpu?/cpufreq; do
            echo userspace > $x/scaling_governor
            cat $x/scaling_max_freq > $x/scaling_setspeed
        done
    "#
            }
            // Not every kernel has every governor, the last one written that exists wins.
            CpuGovernor::Unlock => {
                r#"
        for x in /sys/devices/system/cpu/cpu?/cpufreq; do
            echo ondemand > $x/scaling_governor
            echo sched > $x/scaling_governor
            echo schedutil > $x/scaling_governor
        done
    "#
            }
        }
    }

    pub fn apply(self, device: &AdbDevice) -> anyhow::Result<()> {
        log::info!("Applying CPU governor policy {self:?} to {}", device.serial());
        let output = device.shell_nocheck([self.script()])?;
        if !output.status.success() {
            log::warn!(
                "CPU governor policy {self:?} was not fully applied: {}",
                output.stderr.trim()
            );
        }
        Ok(())
    }
}
