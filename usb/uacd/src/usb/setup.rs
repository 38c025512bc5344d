use super::DescriptorKind;

/// The eight-byte SETUP stage of a control transfer (USB2 9.3).
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Setup {
    pub kind: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

unsafe impl plain::Plain for Setup {}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqDirection {
    HostToDevice = 0,
    DeviceToHost = 1,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqType {
    /// Standard device requests, such as SET_CONFIGURATION and GET_DESCRIPTOR.
    Standard = 0,

    /// Class specific requests. Every audio control request is one of these.
    Class = 1,

    /// Vendor specific requests.
    Vendor = 2,

    /// Reserved
    Reserved = 3,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqRecipient {
    Device = 0,
    Interface = 1,
    Endpoint = 2,
    Other = 3,
    // 4..=30 are reserved
    VendorSpecific = 31,
}

#[repr(u8)]
pub enum SetupReq {
    GetStatus = 0x00,
    ClearFeature = 0x01,
    SetFeature = 0x03,
    SetAddress = 0x05,
    GetDescriptor = 0x06,
    SetDescriptor = 0x07,
    GetConfiguration = 0x08,
    SetConfiguration = 0x09,
    GetInterface = 0x0A,
    SetInterface = 0x0B,
    SynchFrame = 0x0C,
}

pub const USB_SETUP_DIR_BIT: u8 = 1 << 7;
pub const USB_SETUP_DIR_SHIFT: u8 = 7;
pub const USB_SETUP_REQ_TY_MASK: u8 = 0x60;
pub const USB_SETUP_REQ_TY_SHIFT: u8 = 5;
pub const USB_SETUP_RECIPIENT_MASK: u8 = 0x1F;
pub const USB_SETUP_RECIPIENT_SHIFT: u8 = 0;

/// Builds bmRequestType from its three fields.
pub const fn request_type(direction: ReqDirection, ty: ReqType, recipient: ReqRecipient) -> u8 {
    ((direction as u8) << USB_SETUP_DIR_SHIFT)
        | ((ty as u8) << USB_SETUP_REQ_TY_SHIFT)
        | ((recipient as u8) << USB_SETUP_RECIPIENT_SHIFT)
}

impl Setup {
    pub fn direction(&self) -> ReqDirection {
        if self.kind & USB_SETUP_DIR_BIT == 0 {
            ReqDirection::HostToDevice
        } else {
            ReqDirection::DeviceToHost
        }
    }
    pub const fn req_ty(&self) -> u8 {
        (self.kind & USB_SETUP_REQ_TY_MASK) >> USB_SETUP_REQ_TY_SHIFT
    }

    pub const fn req_recipient(&self) -> u8 {
        (self.kind & USB_SETUP_RECIPIENT_MASK) >> USB_SETUP_RECIPIENT_SHIFT
    }
    pub fn is_class(&self) -> bool {
        self.req_ty() == ReqType::Class as u8
    }
    pub fn is_input(&self) -> bool {
        self.direction() == ReqDirection::DeviceToHost
    }

    pub const fn get_descriptor(
        kind: DescriptorKind,
        index: u8,
        language: u16,
        length: u16,
    ) -> Self {
        Self {
            kind: 0b1000_0000,
            request: SetupReq::GetDescriptor as u8,
            value: ((kind as u16) << 8) | (index as u16),
            index: language,
            length,
        }
    }

    pub const fn set_configuration(value: u8) -> Self {
        Self {
            kind: 0b0000_0000,
            request: SetupReq::SetConfiguration as u8,
            value: value as u16,
            index: 0,
            length: 0,
        }
    }

    pub const fn set_interface(interface: u8, alternate_setting: u8) -> Self {
        Self {
            kind: 0b0000_0001,
            request: SetupReq::SetInterface as u8,
            value: alternate_setting as u16,
            index: interface as u16,
            length: 0,
        }
    }

    /// A class request, as used by every audio control.
    pub const fn class(
        direction: ReqDirection,
        recipient: ReqRecipient,
        request: u8,
        value: u16,
        index: u16,
        length: u16,
    ) -> Self {
        Self {
            kind: request_type(direction, ReqType::Class, recipient),
            request,
            value,
            index,
            length,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn class_request_type() {
        let get = Setup::class(
            ReqDirection::DeviceToHost,
            ReqRecipient::Interface,
            0x81,
            0x0100,
            0x0200,
            1,
        );
        assert_eq!(get.kind, 0xA1);
        assert!(get.is_class());
        assert!(get.is_input());

        let set = Setup::class(
            ReqDirection::HostToDevice,
            ReqRecipient::Endpoint,
            0x01,
            0x0100,
            0x0081,
            3,
        );
        assert_eq!(set.kind, 0x22);
        assert_eq!(set.req_recipient(), ReqRecipient::Endpoint as u8);
        assert!(!set.is_input());
    }

    #[test]
    fn get_descriptor_value() {
        let setup = Setup::get_descriptor(DescriptorKind::Configuration, 1, 0, 9);
        let value = setup.value;
        assert_eq!(value, 0x0201);
        assert!(setup.is_input());
    }
}
