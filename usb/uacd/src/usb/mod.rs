//! Standard USB descriptors and setup packets.
//!
//! These are the chapter 9 structures that both USB Audio 1.0 and 2.0 functions are built on.
//! The class-specific audio records live in [crate::uac] and [crate::entity].
//!
//! - USB2  - [Universal Serial Bus Specification](https://www.usb.org/document-library/usb-20-specification)
//! - ECN   - Interface Association Descriptor ECN to USB2
pub use self::config::ConfigDescriptor;
pub use self::device::DeviceDescriptor;
pub use self::endpoint::{
    EndpointDescriptor, EndpointTy, ENDP_ATTR_SYNC_MASK, ENDP_ATTR_TY_MASK, ENDP_ATTR_USAGE_MASK,
};
pub use self::interface::{InterfaceAssociationDescriptor, InterfaceDescriptor};
pub use self::setup::{ReqDirection, ReqRecipient, ReqType, Setup, SetupReq};

/// Enumerates the descriptor kinds (bDescriptorType) this crate reads or writes.
/// (See USB2 Table 9-5, and the audio class specifications for the class-specific kinds)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum DescriptorKind {
    /// A Device Descriptor. See [DeviceDescriptor]
    Device = 1,
    /// A Configuration Descriptor. See [ConfigDescriptor]
    Configuration = 2,
    /// A String Descriptor.
    String = 3,
    /// An Interface Descriptor. See [InterfaceDescriptor]
    Interface = 4,
    /// An Endpoint Descriptor. See [EndpointDescriptor]
    Endpoint = 5,
    /// An Interface Association Descriptor. See [InterfaceAssociationDescriptor]
    InterfaceAssociation = 11,
    /// A class-specific interface descriptor (CS_INTERFACE).
    ClassInterface = 0x24,
    /// A class-specific endpoint descriptor (CS_ENDPOINT).
    ClassEndpoint = 0x25,
}

impl DescriptorKind {
    pub fn from_u8(kind: u8) -> Option<Self> {
        Some(match kind {
            1 => Self::Device,
            2 => Self::Configuration,
            3 => Self::String,
            4 => Self::Interface,
            5 => Self::Endpoint,
            11 => Self::InterfaceAssociation,
            0x24 => Self::ClassInterface,
            0x25 => Self::ClassEndpoint,
            _ => return None,
        })
    }
}

pub(crate) mod config;
pub(crate) mod device;
pub(crate) mod endpoint;
pub(crate) mod interface;
pub(crate) mod setup;
