//! Translation of USB Audio 2.0 class requests into USB Audio 1.0 ones.
//!
//! The host addresses controls the Audio 2.0 way: a control selector and channel number on an
//! entity, with CUR, RANGE and MEM attributes. Each entity family maps that onto the matching
//! Audio 1.0 request, or answers from the local model when Audio 1.0 has no equivalent (the
//! synthesized clock entities).

use smallvec::SmallVec;

use crate::entity::EntityKind;
use crate::error::DispatchError;
use crate::model::UsbConfiguration;
use crate::requests::LegacyControl;
use crate::transport::DeviceTransport;
use crate::uac::{v1, v2};
use crate::usb::{ReqRecipient, Setup};

mod clock;
mod feature;
mod mixer;
mod processing;
mod streaming;

pub use self::streaming::{match_alternate_setting, select_alternate_setting};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Get,
    Set,
}

/// The request attribute (bRequest) of an Audio 2.0 class request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestKind {
    Current,
    Range,
    Memory,
}

/// One Audio 2.0 class request aimed at an entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControlRequest<'a> {
    pub interface_number: u8,
    pub entity_id: u8,
    pub control_selector: u8,
    pub channel: u8,
    pub direction: Direction,
    pub request_kind: RequestKind,
    /// Data stage of a Set.
    pub payload: &'a [u8],
    /// wLength: the most a Get may return.
    pub length: u16,
}

impl<'a> ControlRequest<'a> {
    /// Decodes the setup packet of an Audio 2.0 class request to an interface.
    pub fn from_setup(setup: &Setup, payload: &'a [u8]) -> Result<Self, DispatchError> {
        let (value, index, length) = (setup.value, setup.index, setup.length);
        if !setup.is_class() {
            return Err(DispatchError::InvalidRequest("not a class request"));
        }
        if setup.req_recipient() != ReqRecipient::Interface as u8 {
            return Err(DispatchError::InvalidRequest(
                "only interface requests are translated",
            ));
        }
        let request_kind = match setup.request {
            v2::CUR => RequestKind::Current,
            v2::RANGE => RequestKind::Range,
            v2::MEM => RequestKind::Memory,
            _ => return Err(DispatchError::InvalidRequest("unknown request attribute")),
        };
        let direction = if setup.is_input() {
            Direction::Get
        } else {
            Direction::Set
        };

        Ok(Self {
            interface_number: index as u8,
            entity_id: (index >> 8) as u8,
            control_selector: (value >> 8) as u8,
            channel: value as u8,
            direction,
            request_kind,
            payload,
            length,
        })
    }

    /// wValue as sent. MEM requests use it as the memory offset.
    pub fn value(&self) -> u16 {
        u16::from(self.control_selector) << 8 | u16::from(self.channel)
    }

    fn not_supported(&self) -> DispatchError {
        DispatchError::NotSupported {
            entity: self.entity_id,
            selector: self.control_selector,
        }
    }

    fn legacy(&self, selector: u8, channel: u8) -> LegacyControl {
        LegacyControl::new(self.interface_number, self.entity_id, selector, channel)
    }

    /// The payload of a Set, checked to hold at least `width` bytes.
    fn payload(&self, width: usize) -> Result<&'a [u8], DispatchError> {
        self.payload
            .get(..width)
            .ok_or(DispatchError::BufferTooSmall {
                needed: width,
                available: self.payload.len(),
            })
    }

    /// Checks that a Get of the current value can return all `width` bytes.
    fn check_length(&self, width: usize) -> Result<(), DispatchError> {
        if usize::from(self.length) < width {
            return Err(DispatchError::BufferTooSmall {
                needed: width,
                available: usize::from(self.length),
            });
        }
        Ok(())
    }
}

/// The reply to a [ControlRequest].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ControlResponse {
    /// Data stage of a Get, at most wLength bytes.
    pub data: SmallVec<[u8; 16]>,
    pub bytes_transferred: usize,
}

impl ControlResponse {
    fn get(request: &ControlRequest, bytes: &[u8]) -> Self {
        let count = bytes.len().min(usize::from(request.length));
        Self {
            data: SmallVec::from_slice(&bytes[..count]),
            bytes_transferred: count,
        }
    }

    fn set(count: usize) -> Self {
        Self {
            data: SmallVec::new(),
            bytes_transferred: count,
        }
    }
}

/// An Audio 1.0 control an Audio 2.0 control selector maps to.
#[derive(Clone, Copy, Debug)]
struct Mapping {
    /// Selector of the Audio 1.0 request.
    selector: u8,
    /// Width of the value in Audio 1.0 requests.
    width: usize,
    /// Width of the value in Audio 2.0 requests. Wider values are zero-extended.
    target_width: usize,
    /// Whether GET_MIN/MAX/RES exist for the control, so a RANGE can be synthesized.
    ranged: bool,
}

impl Mapping {
    const fn new(selector: u8, width: usize, ranged: bool) -> Self {
        Self {
            selector,
            width,
            target_width: width,
            ranged,
        }
    }

    const fn widened(selector: u8, width: usize, target_width: usize) -> Self {
        Self {
            selector,
            width,
            target_width,
            ranged: true,
        }
    }
}

/// Forwards a CUR or RANGE request of a fixed-width control.
fn forward<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    request: &ControlRequest,
    legacy: LegacyControl,
    mapping: Mapping,
) -> Result<ControlResponse, DispatchError> {
    match (request.request_kind, request.direction) {
        (RequestKind::Current, Direction::Get) => {
            request.check_length(mapping.target_width)?;
            let mut value = [0u8; 4];
            legacy.get_exact(transport, v1::GET_CUR, &mut value[..mapping.width])?;
            Ok(ControlResponse::get(request, &value[..mapping.target_width]))
        }
        (RequestKind::Current, Direction::Set) => {
            let payload = request.payload(mapping.target_width)?;
            let (value, rest) = payload.split_at(mapping.width);
            if rest.iter().any(|byte| *byte != 0) {
                return Err(DispatchError::InvalidRequest(
                    "value does not fit the device's control",
                ));
            }
            legacy.set(transport, v1::SET_CUR, value)?;
            Ok(ControlResponse::set(mapping.target_width))
        }
        (RequestKind::Range, Direction::Get) if mapping.ranged => {
            let range = legacy.get_range(transport, mapping.width, mapping.target_width)?;
            Ok(ControlResponse::get(request, &range))
        }
        (RequestKind::Range, Direction::Set) if mapping.ranged => {
            Err(DispatchError::InvalidRequest("RANGE is read-only"))
        }
        _ => Err(request.not_supported()),
    }
}

/// Forwards a MEM request as GET_MEM / SET_MEM at the same offset.
fn forward_memory<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    let legacy = LegacyControl::with_value(
        request.interface_number,
        request.entity_id,
        request.value(),
    );
    match request.direction {
        Direction::Get => {
            let mut buffer: SmallVec<[u8; 16]> = SmallVec::from_elem(0, usize::from(request.length));
            let count = legacy.get(transport, v1::GET_MEM, &mut buffer)?;
            Ok(ControlResponse::get(request, &buffer[..count]))
        }
        Direction::Set => {
            legacy.set(transport, v1::SET_MEM, request.payload)?;
            Ok(ControlResponse::set(request.payload.len()))
        }
    }
}

/// Routes class requests of one configuration to the entity they address.
pub struct Dispatcher<'a, T: ?Sized> {
    configuration: &'a mut UsbConfiguration,
    transport: &'a mut T,
}

impl<'a, T: DeviceTransport + ?Sized> Dispatcher<'a, T> {
    pub fn new(configuration: &'a mut UsbConfiguration, transport: &'a mut T) -> Self {
        Self {
            configuration,
            transport,
        }
    }

    pub fn handle(&mut self, request: &ControlRequest) -> Result<ControlResponse, DispatchError> {
        let iface = self
            .configuration
            .interface(request.interface_number)
            .ok_or(DispatchError::UnknownInterface(request.interface_number))?;
        if iface.is_streaming() && request.entity_id == 0 {
            return streaming::interface_control(iface, request);
        }

        let entities = iface.current().and_then(|alt| alt.entities());
        let entity = entities
            .and_then(|entities| entities.get(request.entity_id))
            .ok_or(DispatchError::UnknownEntity {
                interface: request.interface_number,
                entity: request.entity_id,
            })?;
        log::trace!(
            "entity {} of interface {}: {:?} {:?} selector {} channel {}",
            request.entity_id,
            request.interface_number,
            request.direction,
            request.request_kind,
            request.control_selector,
            request.channel
        );

        let transport = &mut *self.transport;
        match &entity.kind {
            EntityKind::Feature(unit) => feature::handle(transport, unit, request),
            EntityKind::Mixer(unit) => {
                let inputs = entities.map_or(0, |list| list.input_channels(request.entity_id));
                mixer::handle(transport, unit, inputs, request)
            }
            EntityKind::Selector(unit) => mixer::handle_selector(transport, unit, request),
            EntityKind::Processing(unit) => processing::handle(transport, unit, request),
            EntityKind::Extension(unit) => processing::handle_extension(transport, unit, request),
            EntityKind::ClockSource(_)
            | EntityKind::ClockSelector(_)
            | EntityKind::ClockMultiplier(_) => {
                clock::handle(self.configuration, transport, request)
            }
            EntityKind::InputTerminal(_)
            | EntityKind::OutputTerminal(_)
            | EntityKind::MidiInJack(_)
            | EntityKind::MidiOutJack(_)
            | EntityKind::MidiElement(_) => Err(request.not_supported()),
        }
    }
}
