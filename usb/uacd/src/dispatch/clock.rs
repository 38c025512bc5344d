//! Clock entities exist only in the translated topology. Their state is kept in the model; a
//! rate change is the one thing pushed to the device, as endpoint requests.

use smallvec::SmallVec;

use super::{ControlRequest, ControlResponse, Direction, RequestKind};
use crate::entity::{Entity, EntityKind};
use crate::error::DispatchError;
use crate::model::UsbConfiguration;
use crate::requests;
use crate::topology;
use crate::transport::DeviceTransport;
use crate::uac::v2;

fn entity_mut<'a>(
    configuration: &'a mut UsbConfiguration,
    request: &ControlRequest,
) -> Result<&'a mut Entity, DispatchError> {
    configuration
        .interface_mut(request.interface_number)
        .and_then(|iface| iface.current_mut())
        .and_then(|alt| alt.entities_mut())
        .and_then(|entities| entities.get_mut(request.entity_id))
        .ok_or(DispatchError::UnknownEntity {
            interface: request.interface_number,
            entity: request.entity_id,
        })
}

pub(super) fn handle<T: DeviceTransport + ?Sized>(
    configuration: &mut UsbConfiguration,
    transport: &mut T,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    if request.request_kind == RequestKind::Memory {
        return Err(request.not_supported());
    }
    let is_source = matches!(
        entity_mut(configuration, request)?.kind,
        EntityKind::ClockSource(_)
    );
    if is_source && request.control_selector == v2::CS_SAM_FREQ_CONTROL {
        return sampling_frequency(configuration, transport, request);
    }

    let entity = entity_mut(configuration, request)?;
    match (&mut entity.kind, request.control_selector) {
        (EntityKind::ClockSource(_), v2::CS_CLOCK_VALID_CONTROL) => {
            match (request.request_kind, request.direction) {
                (RequestKind::Current, Direction::Get) => {
                    request.check_length(1)?;
                    Ok(ControlResponse::get(request, &[1]))
                }
                (RequestKind::Current, Direction::Set) => {
                    Err(DispatchError::InvalidRequest("clock validity is read-only"))
                }
                _ => Err(request.not_supported()),
            }
        }
        (EntityKind::ClockSelector(selector), v2::CX_CLOCK_SELECTOR_CONTROL) => {
            match (request.request_kind, request.direction) {
                (RequestKind::Current, Direction::Get) => {
                    request.check_length(1)?;
                    Ok(ControlResponse::get(request, &[selector.position]))
                }
                (RequestKind::Current, Direction::Set) => {
                    let pin = request.payload(1)?[0];
                    if pin == 0 || usize::from(pin) > selector.sources.len() {
                        return Err(DispatchError::InvalidRequest(
                            "clock selector pin out of range",
                        ));
                    }
                    selector.position = pin;
                    Ok(ControlResponse::set(1))
                }
                _ => Err(request.not_supported()),
            }
        }
        (
            EntityKind::ClockMultiplier(multiplier),
            selector @ (v2::CM_NUMERATOR_CONTROL | v2::CM_DENOMINATOR_CONTROL),
        ) => {
            let value = if selector == v2::CM_NUMERATOR_CONTROL {
                &mut multiplier.numerator
            } else {
                &mut multiplier.denominator
            };
            match (request.request_kind, request.direction) {
                (RequestKind::Current, Direction::Get) => {
                    request.check_length(2)?;
                    Ok(ControlResponse::get(request, &value.to_le_bytes()))
                }
                (RequestKind::Current, Direction::Set) => {
                    let payload = request.payload(2)?;
                    let new = u16::from_le_bytes([payload[0], payload[1]]);
                    if new == 0 {
                        return Err(DispatchError::InvalidRequest("multiplier term of zero"));
                    }
                    *value = new;
                    Ok(ControlResponse::set(2))
                }
                _ => Err(request.not_supported()),
            }
        }
        _ => Err(request.not_supported()),
    }
}

fn sampling_frequency<T: DeviceTransport + ?Sized>(
    configuration: &mut UsbConfiguration,
    transport: &mut T,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    let clock = match &mut entity_mut(configuration, request)?.kind {
        EntityKind::ClockSource(clock) => clock,
        _ => return Err(request.not_supported()),
    };

    match (request.request_kind, request.direction) {
        (RequestKind::Current, Direction::Get) => {
            request.check_length(4)?;
            Ok(ControlResponse::get(request, &clock.current_frequency.to_le_bytes()))
        }
        (RequestKind::Current, Direction::Set) => {
            let payload = request.payload(4)?;
            let frequency = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
            if !topology::is_frequency_supported(clock, frequency) {
                return Err(DispatchError::InvalidRequest("unsupported sampling frequency"));
            }

            // The clock keeps its rate unless every endpoint it drives took the new one.
            let endpoints =
                configuration.clocked_endpoints(request.interface_number, request.entity_id);
            for endpoint in endpoints {
                log::debug!("endpoint {:#04x} to {} Hz", endpoint, frequency);
                requests::set_endpoint_frequency(transport, endpoint, frequency)?;
            }
            if let EntityKind::ClockSource(clock) = &mut entity_mut(configuration, request)?.kind {
                clock.current_frequency = frequency;
            }
            Ok(ControlResponse::set(4))
        }
        (RequestKind::Range, Direction::Get) => {
            let mut ranges: SmallVec<[u8; 64]> = SmallVec::new();
            ranges.extend_from_slice(&(clock.ranges.len() as u16).to_le_bytes());
            for range in &clock.ranges {
                ranges.extend_from_slice(&range.min.to_le_bytes());
                ranges.extend_from_slice(&range.max.to_le_bytes());
                ranges.extend_from_slice(&range.resolution.to_le_bytes());
            }
            Ok(ControlResponse::get(request, &ranges))
        }
        (RequestKind::Range, Direction::Set) => {
            Err(DispatchError::InvalidRequest("RANGE is read-only"))
        }
        (RequestKind::Memory, _) => Err(request.not_supported()),
    }
}
