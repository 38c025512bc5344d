//! The wire to the device.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::error::{ParseError, TransportError};
use crate::usb::{
    ConfigDescriptor, DescriptorKind, DeviceDescriptor, ReqDirection, ReqType, Setup, SetupReq,
};

/// The data stage of a control transfer.
pub enum DeviceReqData<'a> {
    In(&'a mut [u8]),
    Out(&'a [u8]),
    NoData,
}

impl DeviceReqData<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::In(buf) => buf.len(),
            Self::Out(buf) => buf.len(),
            Self::NoData => 0,
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn direction(&self) -> ReqDirection {
        match self {
            DeviceReqData::Out(_) => ReqDirection::HostToDevice,
            DeviceReqData::NoData => ReqDirection::HostToDevice,
            DeviceReqData::In(_) => ReqDirection::DeviceToHost,
        }
    }
}

/// Sends control transfers to the physical device.
///
/// Errors are handed back to the caller as they are; retrying is up to the implementation.
pub trait DeviceTransport {
    /// Performs one control transfer and returns the number of bytes moved in the data stage.
    fn control_transfer(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buffer: &mut [u8],
        is_input: bool,
    ) -> Result<usize, TransportError>;

    fn request(&mut self, setup: &Setup, data: DeviceReqData) -> Result<usize, TransportError> {
        let (kind, request, value, index) = (setup.kind, setup.request, setup.value, setup.index);
        match data {
            DeviceReqData::In(buffer) => {
                self.control_transfer(kind, request, value, index, buffer, true)
            }
            DeviceReqData::Out(bytes) => {
                let mut buffer: SmallVec<[u8; 64]> = bytes.iter().copied().collect();
                self.control_transfer(kind, request, value, index, &mut buffer, false)
            }
            DeviceReqData::NoData => {
                self.control_transfer(kind, request, value, index, &mut [], false)
            }
        }
    }

    /// Like [DeviceTransport::request], but a short data stage is an error.
    fn request_exact(&mut self, setup: &Setup, data: DeviceReqData) -> Result<(), TransportError> {
        let expected = data.len();
        let actual = self.request(setup, data)?;
        if actual < expected {
            return Err(TransportError::ShortTransfer { expected, actual });
        }
        Ok(())
    }
}

impl<T: DeviceTransport + ?Sized> DeviceTransport for &mut T {
    fn control_transfer(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buffer: &mut [u8],
        is_input: bool,
    ) -> Result<usize, TransportError> {
        (**self).control_transfer(request_type, request, value, index, buffer, is_input)
    }
}

/// A control transfer as seen by a [ReplayTransport].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplayedRequest {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    /// The data stage: the payload of an OUT transfer, or what was returned for an IN transfer.
    pub data: Vec<u8>,
}

/// A device made of recorded descriptors.
///
/// Standard descriptor requests are answered from the recording. Class requests behave like a
/// register file: a SET stores its payload, the matching GET returns it, and a GET of something
/// never stored stalls. Every transfer is logged.
#[derive(Clone, Debug, Default)]
pub struct ReplayTransport {
    device: Vec<u8>,
    configurations: Vec<Vec<u8>>,
    controls: BTreeMap<(u8, u16, u16), Vec<u8>>,
    requests: Vec<ReplayedRequest>,
    pending_error: Option<TransportError>,
}

impl ReplayTransport {
    pub fn new(device: Vec<u8>, configurations: Vec<Vec<u8>>) -> Self {
        Self {
            device,
            configurations,
            ..Self::default()
        }
    }

    /// Splits a dump made of the 18-byte device descriptor followed by every configuration
    /// descriptor, each `wTotalLength` bytes long.
    pub fn from_dump(dump: &[u8]) -> Result<Self, ParseError> {
        if dump.len() < DeviceDescriptor::SIZE {
            return Err(ParseError::Truncated {
                offset: 0,
                needed: DeviceDescriptor::SIZE,
                available: dump.len(),
            });
        }
        let (device, mut rest) = dump.split_at(DeviceDescriptor::SIZE);
        let mut offset = DeviceDescriptor::SIZE;
        let mut configurations = Vec::new();

        while !rest.is_empty() {
            let header = plain::from_bytes::<ConfigDescriptor>(rest).map_err(|_| {
                ParseError::Truncated {
                    offset,
                    needed: ConfigDescriptor::SIZE,
                    available: rest.len(),
                }
            })?;
            let total_length = usize::from(header.total_length);
            if total_length < ConfigDescriptor::SIZE {
                return Err(ParseError::UnknownRequiredField {
                    offset,
                    field: "wTotalLength",
                });
            }
            if total_length > rest.len() {
                return Err(ParseError::Truncated {
                    offset,
                    needed: total_length,
                    available: rest.len(),
                });
            }
            let (configuration, next) = rest.split_at(total_length);
            configurations.push(configuration.to_vec());
            rest = next;
            offset += total_length;
        }

        Ok(Self::new(device.to_vec(), configurations))
    }

    /// Presets the value a class GET returns. `request` is the GET request code.
    pub fn set_control(&mut self, request: u8, value: u16, index: u16, data: &[u8]) {
        self.controls
            .insert((request & 0x7F, value, index), data.to_vec());
    }

    /// The value stored by the last class SET, or preset with [ReplayTransport::set_control].
    pub fn control(&self, request: u8, value: u16, index: u16) -> Option<&[u8]> {
        self.controls
            .get(&(request & 0x7F, value, index))
            .map(Vec::as_slice)
    }

    /// Makes the next transfer fail with `error`.
    pub fn fail_next(&mut self, error: TransportError) {
        self.pending_error = Some(error);
    }

    pub fn requests(&self) -> &[ReplayedRequest] {
        &self.requests
    }

    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    fn standard_in(
        &self,
        request: u8,
        value: u16,
        buffer: &mut [u8],
    ) -> Result<usize, TransportError> {
        if request != SetupReq::GetDescriptor as u8 {
            return Err(TransportError::Stall);
        }
        let kind = (value >> 8) as u8;
        let index = usize::from(value as u8);
        let source = match DescriptorKind::from_u8(kind) {
            Some(DescriptorKind::Device) => &self.device,
            Some(DescriptorKind::Configuration) => {
                self.configurations.get(index).ok_or(TransportError::Stall)?
            }
            _ => return Err(TransportError::Stall),
        };
        let count = source.len().min(buffer.len());
        buffer[..count].copy_from_slice(&source[..count]);
        Ok(count)
    }
}

impl DeviceTransport for ReplayTransport {
    fn control_transfer(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buffer: &mut [u8],
        is_input: bool,
    ) -> Result<usize, TransportError> {
        if let Some(error) = self.pending_error.take() {
            return Err(error);
        }

        let setup = Setup {
            kind: request_type,
            request,
            value,
            index,
            length: buffer.len() as u16,
        };
        let count = if setup.req_ty() == ReqType::Standard as u8 {
            if is_input {
                self.standard_in(request, value, buffer)?
            } else {
                0
            }
        } else {
            let key = (request & 0x7F, value, index);
            if is_input {
                let stored = self.controls.get(&key).ok_or(TransportError::Stall)?;
                let count = stored.len().min(buffer.len());
                buffer[..count].copy_from_slice(&stored[..count]);
                count
            } else {
                self.controls.insert(key, buffer.to_vec());
                buffer.len()
            }
        };

        log::trace!(
            "replay {:#04x} {:#04x} value={:#06x} index={:#06x} -> {} bytes",
            request_type,
            request,
            value,
            index,
            count
        );
        self.requests.push(ReplayedRequest {
            request_type,
            request,
            value,
            index,
            data: buffer[..count].to_vec(),
        });
        Ok(count)
    }
}
