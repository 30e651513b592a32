use std::process::ExitStatus;

/// A checked `adb` invocation exited unsuccessfully.
#[derive(Debug, thiserror::Error)]
#[error("'{command}' failed with {status}: {stderr}")]
pub struct AdbCommandError {
    pub command: String,
    pub status: ExitStatus,
    pub stderr: String,
}

/// No single target device could be chosen from the devices known to the adb server.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DeviceDiscoveryError {
    #[error("No devices connected to adb")]
    NoDevices,
    #[error(
        "More than one device connected ({}), set ANDROID_SERIAL or pass --serial to pick one",
        .serials.join(", ")
    )]
    MultipleDevices { serials: Vec<String> },
    #[error("Device '{serial}' is not connected to adb")]
    NotFound { serial: String },
    #[error("Device '{serial}' is not ready, adb reports it as '{state}'")]
    NotReady { serial: String, state: String },
}
