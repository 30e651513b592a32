//! Runs `adb` as a subprocess against a single device.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::Context;

use crate::devices::{parse_devices, select_device};
use crate::error::AdbCommandError;

/// Captured result of a device shell command.
#[derive(Debug, Clone)]
pub struct ShellOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    fn from_output(output: Output) -> Self {
        Self {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// A device reachable through the host `adb` binary.
///
/// Every command is run with `-s <serial>` so that other connected devices are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbDevice {
    adb_path: PathBuf,
    serial: String,
}

impl AdbDevice {
    pub fn new(adb_path: impl Into<PathBuf>, serial: impl Into<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
            serial: serial.into(),
        }
    }

    /// Find the target device by asking the adb server for its device list.
    ///
    /// See [crate::prelude::select_device] for how the device is chosen.
    pub fn get_device(adb_path: impl Into<PathBuf>, serial: Option<&str>) -> anyhow::Result<Self> {
        let adb_path = adb_path.into();
        let output = Command::new(&adb_path)
            .arg("devices")
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute '{} devices'", adb_path.display()))?;
        if !output.status.success() {
            return Err(command_error(&adb_path, &[OsString::from("devices")], output).into());
        }

        let stdout = String::from_utf8(output.stdout)
            .context("Failed to parse output of 'adb devices' as UTF-8")?;
        let serial = select_device(&parse_devices(&stdout), serial)?;
        log::info!("Using device {serial}");

        Ok(Self { adb_path, serial })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn adb_path(&self) -> &Path {
        &self.adb_path
    }

    /// The argument prefix every command for this device starts with.
    pub fn adb_cmd(&self) -> Vec<OsString> {
        vec![OsString::from("-s"), OsString::from(&self.serial)]
    }

    /// Write `size_bytes` into device RAM through the `sink` service, reading them from `input`.
    ///
    /// `input` must be positioned at the start of at least `size_bytes` bytes.
    pub fn raw_sink(&self, size_bytes: u64, input: File) -> anyhow::Result<()> {
        let args = self.args(["raw".to_string(), format!("sink:{size_bytes}")]);
        self.run_checked(&args, Stdio::from(input), Stdio::null())?;
        Ok(())
    }

    /// Read `size_bytes` out of device RAM through the `source` service, discarding the bytes.
    pub fn raw_source(&self, size_bytes: u64) -> anyhow::Result<()> {
        let args = self.args(["raw".to_string(), format!("source:{size_bytes}")]);
        self.run_checked(&args, Stdio::null(), Stdio::null())?;
        Ok(())
    }

    /// Run a shell command on the device, failing if it exits non-zero.
    pub fn shell<I, S>(&self, command: I) -> anyhow::Result<ShellOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = self.shell_args(command);
        let output = self.run_checked(&args, Stdio::null(), Stdio::piped())?;
        Ok(ShellOutput::from_output(output))
    }

    /// Run a shell command on the device, failing if it exits non-zero, without keeping its stdout.
    ///
    /// Use this for commands that stream large amounts of data back to the host.
    pub fn shell_discard_output<I, S>(&self, command: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = self.shell_args(command);
        self.run_checked(&args, Stdio::null(), Stdio::null())?;
        Ok(())
    }

    /// Run a shell command on the device and return its output whatever the exit status.
    ///
    /// Only failing to start `adb` is an error.
    pub fn shell_nocheck<I, S>(&self, command: I) -> anyhow::Result<ShellOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = self.shell_args(command);
        let output = self.output(&args, Stdio::null(), Stdio::piped())?;
        if !output.status.success() {
            log::debug!(
                "Unchecked shell command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(ShellOutput::from_output(output))
    }

    /// Copy a host file to the device. `parameters` are passed to `adb push` before the paths,
    /// e.g. `-Z` to disable compression.
    pub fn push(
        &self,
        local: impl AsRef<Path>,
        remote: &str,
        parameters: &[&str],
    ) -> anyhow::Result<()> {
        let args = self.transfer_args(
            "push",
            parameters,
            local.as_ref().as_os_str(),
            OsStr::new(remote),
        );
        self.run_checked(&args, Stdio::null(), Stdio::null())?;
        Ok(())
    }

    /// Copy a device file to the host. `parameters` are passed to `adb pull` before the paths.
    pub fn pull(
        &self,
        remote: &str,
        local: impl AsRef<Path>,
        parameters: &[&str],
    ) -> anyhow::Result<()> {
        let args = self.transfer_args(
            "pull",
            parameters,
            OsStr::new(remote),
            local.as_ref().as_os_str(),
        );
        self.run_checked(&args, Stdio::null(), Stdio::null())?;
        Ok(())
    }

    fn args<I, S>(&self, rest: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut args = self.adb_cmd();
        args.extend(rest.into_iter().map(|arg| arg.as_ref().to_os_string()));
        args
    }

    fn shell_args<I, S>(&self, command: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut args = self.args(["shell"]);
        args.extend(command.into_iter().map(|arg| arg.as_ref().to_os_string()));
        args
    }

    fn transfer_args(
        &self,
        direction: &str,
        parameters: &[&str],
        from: &OsStr,
        to: &OsStr,
    ) -> Vec<OsString> {
        let mut args = self.args([direction]);
        args.extend(parameters.iter().map(OsString::from));
        args.push(from.to_os_string());
        args.push(to.to_os_string());
        args
    }

    fn output(&self, args: &[OsString], stdin: Stdio, stdout: Stdio) -> anyhow::Result<Output> {
        log::debug!("Running: {}", display_command(&self.adb_path, args));

        Command::new(&self.adb_path)
            .args(args)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::piped())
            .output()
            .with_context(|| {
                format!(
                    "Failed to execute '{}'",
                    display_command(&self.adb_path, args)
                )
            })
    }

    fn run_checked(
        &self,
        args: &[OsString],
        stdin: Stdio,
        stdout: Stdio,
    ) -> anyhow::Result<Output> {
        let output = self.output(args, stdin, stdout)?;
        if !output.status.success() {
            return Err(command_error(&self.adb_path, args, output).into());
        }
        Ok(output)
    }
}

fn command_error(adb_path: &Path, args: &[OsString], output: Output) -> AdbCommandError {
    AdbCommandError {
        command: display_command(adb_path, args),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

fn display_command(adb_path: &Path, args: &[OsString]) -> String {
    std::iter::once(adb_path.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
