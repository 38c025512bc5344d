//! Implements the "Device" USB Descriptor.
//!
//! This descriptor is described in USB2 section 9.6.1

use std::mem;

/// A USB Device Descriptor.
///
/// A given device will only have one device descriptor. USB2 Table 9-8 describes the packet
/// offsets of the fields described by this structure.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceDescriptor {
    /// The length of this descriptor in bytes (bLength).
    pub length: u8,
    /// The descriptor type. See [super::DescriptorKind]
    pub kind: u8,
    /// The USB standard version in binary-coded decimal.
    ///
    /// USB 1.1 would be encoded as 110H, 2.0 as 200H.
    pub usb: u16,
    /// bDeviceClass. Zero means every interface declares its own class.
    pub class: u8,
    /// bDeviceSubClass
    pub sub_class: u8,
    /// bDeviceProtocol
    pub protocol: u8,
    /// bMaxPacketSize0
    pub packet_size: u8,
    /// idVendor
    pub vendor: u16,
    /// idProduct
    pub product: u16,
    /// bcdDevice
    pub release: u16,
    /// iManufacturer
    pub manufacturer_str: u8,
    /// iProduct
    pub product_str: u8,
    /// iSerialNumber
    pub serial_str: u8,
    /// bNumConfigurations
    pub configurations: u8,
}

unsafe impl plain::Plain for DeviceDescriptor {}

/// Miscellaneous device class, used together with [DEVICE_SUBCLASS_COMMON] and
/// [DEVICE_PROTOCOL_IAD] to announce Interface Association Descriptors.
pub const DEVICE_CLASS_MISC: u8 = 0xEF;
pub const DEVICE_SUBCLASS_COMMON: u8 = 0x02;
pub const DEVICE_PROTOCOL_IAD: u8 = 0x01;

impl DeviceDescriptor {
    pub const SIZE: usize = mem::size_of::<Self>();

    /// The descriptor as a USB Audio 2.0 host must see it.
    ///
    /// Audio 2.0 functions are grouped by an Interface Association Descriptor, which requires the
    /// IAD class triple on the device, and a bcdUSB of at least 2.00.
    pub fn with_interface_association(&self) -> Self {
        let mut desc = *self;
        desc.class = DEVICE_CLASS_MISC;
        desc.sub_class = DEVICE_SUBCLASS_COMMON;
        desc.protocol = DEVICE_PROTOCOL_IAD;
        if self.usb < 0x0200 {
            desc.usb = 0x0200;
        }
        desc
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        // SAFETY: the struct is packed and made of integers only, so it has no padding.
        bytes.copy_from_slice(unsafe { plain::as_bytes(self) });
        bytes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn descriptor_size() {
        assert_eq!(DeviceDescriptor::SIZE, 18);
    }

    #[test]
    fn interface_association_rewrite() {
        let desc = DeviceDescriptor {
            length: 18,
            kind: 1,
            usb: 0x0110,
            vendor: 0x1234,
            product: 0x5678,
            configurations: 1,
            ..Default::default()
        };
        let rewritten = desc.with_interface_association();
        let bytes = rewritten.to_bytes();

        assert_eq!(&bytes[2..4], &[0x00, 0x02]);
        assert_eq!(&bytes[4..7], &[0xEF, 0x02, 0x01]);
        assert_eq!(&bytes[8..12], &[0x34, 0x12, 0x78, 0x56]);
        assert_eq!(bytes[17], 1);
    }
}
