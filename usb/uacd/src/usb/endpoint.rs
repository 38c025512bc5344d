use plain::Plain;
use std::mem;

/// The descriptor for a USB Endpoint.
///
/// Each endpoint for a particular interface has its own descriptor. It is returned as part of the
/// Configuration Descriptor and cannot be requested individually.
///
/// See USB2 9.6.6. Audio 1.0 and MIDI 1.0 endpoints append two bytes (bRefresh and
/// bSynchAddress) to this layout; those are kept next to the descriptor in
/// [crate::model::UsbEndpoint].
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointDescriptor {
    pub length: u8,
    pub kind: u8,
    pub address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
}

/// Mask that is ANDed to the [EndpointDescriptor].attributes buffer to get the endpoint type.
pub const ENDP_ATTR_TY_MASK: u8 = 0x3;
/// Isochronous synchronization type, bits 3:2.
pub const ENDP_ATTR_SYNC_MASK: u8 = 0x0C;
/// Isochronous usage type, bits 5:4.
pub const ENDP_ATTR_USAGE_MASK: u8 = 0x30;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EndpointTy {
    Ctrl = 0,
    Isoch = 1,
    Bulk = 2,
    Interrupt = 3,
}

impl EndpointDescriptor {
    /// Size of the standard (USB2) endpoint descriptor.
    pub const SIZE: usize = mem::size_of::<Self>();

    pub fn ty(self) -> EndpointTy {
        match self.attributes & ENDP_ATTR_TY_MASK {
            0 => EndpointTy::Ctrl,
            1 => EndpointTy::Isoch,
            2 => EndpointTy::Bulk,
            3 => EndpointTy::Interrupt,
            _ => unreachable!(),
        }
    }
    pub fn is_in(self) -> bool {
        self.address & 0x80 != 0
    }
    /// Isochronous usage type "explicit feedback".
    pub fn is_feedback(self) -> bool {
        self.ty() == EndpointTy::Isoch && (self.attributes & ENDP_ATTR_USAGE_MASK) == 0x10
    }
}

unsafe impl Plain for EndpointDescriptor {}
