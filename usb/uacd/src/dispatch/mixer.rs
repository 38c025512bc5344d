use super::{forward, ControlRequest, ControlResponse, Direction, Mapping, RequestKind};
use crate::entity::{MixerUnit, SelectorUnit};
use crate::error::DispatchError;
use crate::requests::LegacyControl;
use crate::transport::DeviceTransport;
use crate::uac::v2;

/// Mixer controls are addressed by a linear mixer control number in Audio 2.0 and by an
/// (input channel, output channel) pair in Audio 1.0. `input_channels` is the number of logical
/// channels entering the unit.
pub(super) fn handle<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    unit: &MixerUnit,
    input_channels: usize,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    if request.control_selector != v2::MU_MIXER_CONTROL
        || request.request_kind == RequestKind::Memory
    {
        return Err(request.not_supported());
    }
    let number = request.channel;
    if usize::from(number) >= unit.controls_in_use(input_channels) {
        return Err(DispatchError::InvalidRequest("mixer control number out of range"));
    }
    if request.direction == Direction::Set
        && request.request_kind == RequestKind::Current
        && !unit.is_programmable(number)
    {
        return Err(request.not_supported());
    }
    let value = unit
        .legacy_value(number)
        .ok_or(DispatchError::InvalidRequest("mixer has no output channels"))?;

    let legacy = LegacyControl::with_value(request.interface_number, request.entity_id, value);
    forward(transport, request, legacy, Mapping::new(0, 2, true))
}

/// Audio 1.0 selectors have a single control, addressed with wValue 0.
pub(super) fn handle_selector<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    unit: &SelectorUnit,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    if request.control_selector != v2::SU_SELECTOR_CONTROL
        || request.request_kind != RequestKind::Current
    {
        return Err(request.not_supported());
    }
    if request.direction == Direction::Set {
        let pin = request.payload(1)?[0];
        if pin == 0 || usize::from(pin) > unit.sources.len() {
            return Err(DispatchError::InvalidRequest("selector pin out of range"));
        }
    }
    let legacy = LegacyControl::with_value(request.interface_number, request.entity_id, 0);
    forward(transport, request, legacy, Mapping::new(0, 1, false))
}
