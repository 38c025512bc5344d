use plain::Plain;
use std::mem;

/// A USB Interface Descriptor (USB2 9.6.5, Table 9-12).
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct InterfaceDescriptor {
    pub length: u8,
    pub kind: u8,
    pub number: u8,
    pub alternate_setting: u8,
    pub endpoints: u8,
    pub class: u8,
    pub sub_class: u8,
    pub protocol: u8,
    pub interface_str: u8,
}

unsafe impl Plain for InterfaceDescriptor {}

impl InterfaceDescriptor {
    pub const SIZE: usize = mem::size_of::<Self>();
}

/// An Interface Association Descriptor, grouping the interfaces of one function.
///
/// Defined by the IAD engineering change notice to USB2; mandatory in front of every USB Audio 2.0
/// function.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct InterfaceAssociationDescriptor {
    pub length: u8,
    pub kind: u8,
    pub first_interface: u8,
    pub interface_count: u8,
    pub function_class: u8,
    pub function_sub_class: u8,
    pub function_protocol: u8,
    pub function_str: u8,
}

unsafe impl Plain for InterfaceAssociationDescriptor {}

impl InterfaceAssociationDescriptor {
    pub const SIZE: usize = mem::size_of::<Self>();
}
