//! The configuration, interface and alternate-setting index of a device.
//!
//! Everything here is built once, when the device is attached, from the descriptors it returns.
//! Afterwards only the selected configuration, the selected alternate settings and the clock
//! state change.

pub use self::configuration::UsbConfiguration;
pub use self::device::UsbDevice;
pub use self::endpoint::{AsEndpointControls, ClassEndpoint, EndpointKind, UsbEndpoint};
pub use self::format::{AsGeneral, FormatDetails, FormatTypeDescriptor, SampleRates};
pub use self::interface::{
    AlternateSetting, ControlSetting, MidiSetting, SettingKind, StreamingSetting, UsbInterface,
};

mod configuration;
mod device;
mod endpoint;
mod format;
mod interface;
