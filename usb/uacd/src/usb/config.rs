use std::mem;

/// A USB Configuration Descriptor (USB2 9.6.3, Table 9-10).
///
/// `total_length` covers this header and every interface, endpoint and class-specific descriptor
/// that follows it.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigDescriptor {
    pub length: u8,
    pub kind: u8,
    pub total_length: u16,
    pub interfaces: u8,
    pub configuration_value: u8,
    pub configuration_str: u8,
    pub attributes: u8,
    pub max_power: u8,
}

unsafe impl plain::Plain for ConfigDescriptor {}

impl ConfigDescriptor {
    pub const SIZE: usize = mem::size_of::<Self>();
}
