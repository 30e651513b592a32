use crate::error::DeviceDiscoveryError;

/// The state adb reports for a usable device.
pub const DEVICE_READY_STATE: &str = "device";

/// One line of `adb devices` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub serial: String,
    /// `device`, `offline`, `unauthorized`, `recovery`, ...
    pub state: String,
}

impl DeviceEntry {
    pub fn is_ready(&self) -> bool {
        self.state == DEVICE_READY_STATE
    }
}

/// Parse the output of `adb devices`.
///
/// The header line, blank lines and daemon notices such as `* daemon started successfully` are
/// skipped. Every other line is `<serial>\t<state>`.
pub fn parse_devices(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices attached"))
        .filter(|line| !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(DeviceEntry {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// Choose the target device.
///
/// With a serial, that device must be listed and ready. Without one, exactly one ready device
/// must be listed.
pub fn select_device(
    entries: &[DeviceEntry],
    serial: Option<&str>,
) -> Result<String, DeviceDiscoveryError> {
    match serial {
        Some(serial) => {
            let entry = entries
                .iter()
                .find(|entry| entry.serial == serial)
                .ok_or_else(|| DeviceDiscoveryError::NotFound {
                    serial: serial.to_string(),
                })?;

            if !entry.is_ready() {
                return Err(DeviceDiscoveryError::NotReady {
                    serial: entry.serial.clone(),
                    state: entry.state.clone(),
                });
            }

            Ok(entry.serial.clone())
        }
        None => {
            let ready = entries
                .iter()
                .filter(|entry| entry.is_ready())
                .collect::<Vec<_>>();

            match ready.as_slice() {
                [] => Err(DeviceDiscoveryError::NoDevices),
                [only] => Ok(only.serial.clone()),
                many => Err(DeviceDiscoveryError::MultipleDevices {
                    serials: many.iter().map(|entry| entry.serial.clone()).collect(),
                }),
            }
        }
    }
}
