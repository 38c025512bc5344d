//! USB Audio 1.0 class requests, as sent to the device.

use smallvec::SmallVec;

use crate::error::TransportError;
use crate::transport::{DeviceReqData, DeviceTransport};
use crate::uac::v1;
use crate::usb::{ReqDirection, ReqRecipient, Setup};

/// A control of an Audio 1.0 entity: the interface and entity it lives on and the wValue that
/// addresses it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LegacyControl {
    pub interface: u8,
    pub entity: u8,
    pub value: u16,
}

impl LegacyControl {
    /// wValue is `selector << 8 | channel`, the form every Audio 1.0 control but the mixer uses.
    pub fn new(interface: u8, entity: u8, selector: u8, channel: u8) -> Self {
        Self::with_value(interface, entity, u16::from(selector) << 8 | u16::from(channel))
    }

    pub fn with_value(interface: u8, entity: u8, value: u16) -> Self {
        Self {
            interface,
            entity,
            value,
        }
    }

    fn setup(&self, request: u8, length: usize) -> Setup {
        let direction = if request & 0x80 != 0 {
            ReqDirection::DeviceToHost
        } else {
            ReqDirection::HostToDevice
        };
        Setup::class(
            direction,
            ReqRecipient::Interface,
            request,
            self.value,
            u16::from(self.entity) << 8 | u16::from(self.interface),
            length as u16,
        )
    }

    /// Issues a GET request and returns the number of bytes the device returned.
    pub fn get<T: DeviceTransport + ?Sized>(
        &self,
        transport: &mut T,
        request: u8,
        buffer: &mut [u8],
    ) -> Result<usize, TransportError> {
        let setup = self.setup(request, buffer.len());
        transport.request(&setup, DeviceReqData::In(buffer))
    }

    /// Issues a GET request that must fill `buffer`.
    pub fn get_exact<T: DeviceTransport + ?Sized>(
        &self,
        transport: &mut T,
        request: u8,
        buffer: &mut [u8],
    ) -> Result<(), TransportError> {
        let setup = self.setup(request, buffer.len());
        transport.request_exact(&setup, DeviceReqData::In(buffer))
    }

    pub fn set<T: DeviceTransport + ?Sized>(
        &self,
        transport: &mut T,
        request: u8,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let setup = self.setup(request, data.len());
        transport.request_exact(&setup, DeviceReqData::Out(data))
    }

    /// Reads GET_MIN, GET_MAX and GET_RES and packs them as a single Audio 2.0 sub-range.
    ///
    /// Every bound is read `width` bytes wide and zero-extended to `target_width`.
    pub fn get_range<T: DeviceTransport + ?Sized>(
        &self,
        transport: &mut T,
        width: usize,
        target_width: usize,
    ) -> Result<SmallVec<[u8; 16]>, TransportError> {
        let mut range = SmallVec::new();
        range.extend_from_slice(&1u16.to_le_bytes());
        for request in [v1::GET_MIN, v1::GET_MAX, v1::GET_RES] {
            let mut bound = [0u8; 4];
            self.get_exact(transport, request, &mut bound[..width])?;
            range.extend_from_slice(&bound[..target_width]);
        }
        Ok(range)
    }
}

/// SET_CUR of the sampling frequency control of an isochronous endpoint. Audio 1.0 carries the
/// rate in three bytes.
pub fn set_endpoint_frequency<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    endpoint: u8,
    frequency: u32,
) -> Result<(), TransportError> {
    let setup = Setup::class(
        ReqDirection::HostToDevice,
        ReqRecipient::Endpoint,
        v1::SET_CUR,
        u16::from(v1::SAMPLING_FREQ_CONTROL) << 8,
        u16::from(endpoint),
        3,
    );
    let bytes = frequency.to_le_bytes();
    transport.request_exact(&setup, DeviceReqData::Out(&bytes[..3]))
}
