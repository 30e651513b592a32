mod device;
mod devices;
mod error;
mod governor;

pub mod prelude {
    pub use crate::device::{AdbDevice, ShellOutput};
    pub use crate::devices::{parse_devices, select_device, DeviceEntry};
    pub use crate::error::{AdbCommandError, DeviceDiscoveryError};
    pub use crate::governor::CpuGovernor;
}
