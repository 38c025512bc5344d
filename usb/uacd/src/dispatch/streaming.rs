use smallvec::SmallVec;

use super::{ControlRequest, ControlResponse, Direction, RequestKind};
use crate::error::DispatchError;
use crate::model::{UsbConfiguration, UsbInterface};
use crate::topology;
use crate::uac::v2;

/// Controls of a streaming interface itself, addressed as entity 0.
pub(super) fn interface_control(
    iface: &UsbInterface,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    let selector = request.control_selector;
    let known = selector == v2::AS_ACT_ALT_SETTING_CONTROL
        || selector == v2::AS_VAL_ALT_SETTINGS_CONTROL;
    if !known || request.request_kind != RequestKind::Current {
        return Err(request.not_supported());
    }
    if request.direction == Direction::Set {
        return Err(DispatchError::InvalidRequest("alternate setting controls are read-only"));
    }

    if selector == v2::AS_ACT_ALT_SETTING_CONTROL {
        request.check_length(1)?;
        return Ok(ControlResponse::get(request, &[iface.current_alternate]));
    }

    // bControlSize, then one bit per alternate setting.
    let highest = iface
        .alternates
        .iter()
        .map(|alt| alt.alternate_setting)
        .max()
        .unwrap_or(0);
    let size = usize::from(highest / 8) + 1;
    let mut valid: SmallVec<[u8; 16]> = SmallVec::from_elem(0, 1 + size);
    valid[0] = size as u8;
    for alt in &iface.alternates {
        let bit = usize::from(alt.alternate_setting);
        valid[1 + bit / 8] |= 1 << (bit % 8);
    }
    Ok(ControlResponse::get(request, &valid))
}

/// The alternate setting of `interface` that a request for `requested` resolves to.
///
/// For a streaming setting with a format, the request is taken as a wish for that format at the
/// rate its clock currently runs at: the first alternate setting with the same format tag and
/// layout that carries that rate, on a clock that accepts it, is chosen instead. When there is
/// none, or for any other interface, the requested setting is chosen as is.
pub fn match_alternate_setting(
    configuration: &UsbConfiguration,
    interface: u8,
    requested: u8,
) -> Result<u8, DispatchError> {
    let iface = configuration
        .interface(interface)
        .ok_or(DispatchError::UnknownInterface(interface))?;
    let alt = iface
        .alternate(requested)
        .ok_or(DispatchError::InvalidRequest("no such alternate setting"))?;
    let wanted = match alt.streaming() {
        Some(streaming) => streaming,
        None => return Ok(requested),
    };
    let format = match &wanted.format {
        Some(format) => format,
        None => return Ok(requested),
    };
    let frequency = match configuration.stream_clock(interface, requested) {
        Some(clock) => clock.current_frequency,
        None => return Ok(requested),
    };

    let found = iface.alternates.iter().find(|alt| {
        let streaming = match alt.streaming() {
            Some(streaming) => streaming,
            None => return false,
        };
        let candidate = match &streaming.format {
            Some(candidate) => candidate,
            None => return false,
        };
        streaming.format_tag() == wanted.format_tag()
            && candidate.matches_structure(format)
            && candidate.supports_frequency(frequency)
            && configuration
                .stream_clock(interface, alt.alternate_setting)
                .map_or(false, |clock| topology::is_frequency_supported(clock, frequency))
    });
    let actual = found.map_or(requested, |alt| alt.alternate_setting);
    if actual != requested {
        log::debug!(
            "interface {}: alternate setting {} replaced by {}",
            interface,
            requested,
            actual
        );
    }
    Ok(actual)
}

/// Resolves `requested` with [match_alternate_setting] and makes the result current.
pub fn select_alternate_setting(
    configuration: &mut UsbConfiguration,
    interface: u8,
    requested: u8,
) -> Result<u8, DispatchError> {
    let actual = match_alternate_setting(configuration, interface, requested)?;
    if let Some(iface) = configuration.interface_mut(interface) {
        iface.current_alternate = actual;
    }
    Ok(actual)
}
