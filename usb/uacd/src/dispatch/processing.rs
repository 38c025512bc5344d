use super::{
    forward, forward_memory, ControlRequest, ControlResponse, Mapping, RequestKind,
};
use crate::entity::{ExtensionUnit, ProcessKind, ProcessingUnit};
use crate::error::DispatchError;
use crate::transport::DeviceTransport;
use crate::uac::{v1, v2};

/// An Audio 2.0 control of a processing or effect unit: its Audio 1.0 counterpart, and the
/// bmControls bit announcing it.
struct UnitControl {
    bit: u8,
    mapping: Mapping,
}

const fn control(bit: u8, selector: u8, width: usize, ranged: bool) -> Option<UnitControl> {
    Some(UnitControl {
        bit,
        mapping: Mapping::new(selector, width, ranged),
    })
}

fn unit_control(kind: &ProcessKind, selector: u8) -> Option<UnitControl> {
    // Enable is selector 1 and bit 0 for every process type of both releases.
    if selector == v2::UD_ENABLE_CONTROL {
        return control(0, v1::ENABLE_CONTROL, 1, false);
    }
    match (kind, selector) {
        (ProcessKind::UpDownMix { .. }, v2::UD_MODE_SELECT_CONTROL)
        | (ProcessKind::DolbyPrologic { .. }, v2::DP_MODE_SELECT_CONTROL) => {
            control(1, v1::MODE_SELECT_CONTROL, 1, false)
        }
        (ProcessKind::StereoExtender, v2::ST_EXT_WIDTH_CONTROL) => {
            control(1, v1::SPACIOUSNESS_CONTROL, 1, true)
        }
        // Audio 1.0 reverberation has a type bit but no request to change it.
        (ProcessKind::Reverberation, v2::RV_LEVEL_CONTROL) => {
            control(2, v1::REVERB_LEVEL_CONTROL, 1, true)
        }
        (ProcessKind::Reverberation, v2::RV_TIME_CONTROL) => {
            control(3, v1::REVERB_TIME_CONTROL, 2, true)
        }
        (ProcessKind::Reverberation, v2::RV_FEEDBACK_CONTROL) => {
            control(4, v1::REVERB_FEEDBACK_CONTROL, 1, true)
        }
        (ProcessKind::Chorus, v2::MD_BALANCE_CONTROL) => {
            control(1, v1::CHORUS_LEVEL_CONTROL, 1, true)
        }
        (ProcessKind::Chorus, v2::MD_RATE_CONTROL) => control(2, v1::CHORUS_RATE_CONTROL, 2, true),
        (ProcessKind::Chorus, v2::MD_DEPTH_CONTROL) => {
            control(3, v1::CHORUS_DEPTH_CONTROL, 2, true)
        }
        (ProcessKind::DynamicRangeCompression, v2::DR_COMPRESSION_RATE_CONTROL) => {
            control(1, v1::COMPRESSION_RATE_CONTROL, 2, true)
        }
        (ProcessKind::DynamicRangeCompression, v2::DR_MAXAMPL_CONTROL) => {
            control(2, v1::MAXAMPL_CONTROL, 2, true)
        }
        (ProcessKind::DynamicRangeCompression, v2::DR_THRESHOLD_CONTROL) => {
            control(3, v1::THRESHOLD_CONTROL, 2, true)
        }
        (ProcessKind::DynamicRangeCompression, v2::DR_ATTACK_TIME_CONTROL) => {
            control(4, v1::ATTACK_TIME, 2, true)
        }
        (ProcessKind::DynamicRangeCompression, v2::DR_RELEASE_TIME_CONTROL) => {
            control(5, v1::RELEASE_TIME, 2, true)
        }
        _ => None,
    }
}

/// Processing units, and the Audio 1.0 processing units presented as Effect Units.
pub(super) fn handle<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    unit: &ProcessingUnit,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    if request.request_kind == RequestKind::Memory {
        return forward_memory(transport, request);
    }
    let control = unit_control(&unit.kind, request.control_selector)
        .filter(|control| unit.find_control(control.bit))
        .ok_or_else(|| request.not_supported())?;

    // Effects are controlled as a whole; only the master channel exists.
    if unit.is_effect() && request.channel != 0 {
        return Err(DispatchError::InvalidRequest("channel out of range"));
    }
    let legacy = request.legacy(control.mapping.selector, 0);
    forward(transport, request, legacy, control.mapping)
}

pub(super) fn handle_extension<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    unit: &ExtensionUnit,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    if request.request_kind == RequestKind::Memory {
        return forward_memory(transport, request);
    }
    if request.control_selector != v2::XU_ENABLE_CONTROL || !unit.find_control(0) {
        return Err(request.not_supported());
    }
    let legacy = request.legacy(v1::ENABLE_CONTROL, 0);
    forward(
        transport,
        request,
        legacy,
        Mapping::new(v1::ENABLE_CONTROL, 1, false),
    )
}

#[cfg(test)]
mod test {
    use super::super::Direction;
    use super::*;
    use crate::entity::ChannelCluster;
    use crate::transport::ReplayTransport;
    use smallvec::smallvec;

    fn unit(kind: ProcessKind, controls: u8) -> ProcessingUnit {
        ProcessingUnit {
            process_type: 0,
            sources: smallvec![2],
            cluster: ChannelCluster::default(),
            controls: smallvec![controls],
            kind,
        }
    }

    fn request(selector: u8, kind: RequestKind, payload: &[u8]) -> ControlRequest {
        ControlRequest {
            interface_number: 0,
            entity_id: 5,
            control_selector: selector,
            channel: 0,
            direction: if payload.is_empty() {
                Direction::Get
            } else {
                Direction::Set
            },
            request_kind: kind,
            payload,
            length: 14,
        }
    }

    #[test]
    fn reverberation_selectors_shift_down() {
        let mut transport = ReplayTransport::default();
        let reverb = unit(ProcessKind::Reverberation, 0b1_1111);
        let time = request(v2::RV_TIME_CONTROL, RequestKind::Current, &[0x00, 0x02]);
        handle(&mut transport, &reverb, &time).unwrap();
        assert_eq!(transport.requests()[0].value, 0x0300);
        assert_eq!(transport.requests()[0].index, 0x0500);

        let kind = request(v2::RV_TYPE_CONTROL, RequestKind::Current, &[]);
        assert!(matches!(
            handle(&mut transport, &reverb, &kind),
            Err(DispatchError::NotSupported { .. })
        ));
    }

    #[test]
    fn stereo_width_is_spaciousness() {
        let mut transport = ReplayTransport::default();
        let extender = unit(ProcessKind::StereoExtender, 0b11);
        transport.set_control(v1::GET_MIN, 0x0300, 0x0500, &[0]);
        transport.set_control(v1::GET_MAX, 0x0300, 0x0500, &[255]);
        transport.set_control(v1::GET_RES, 0x0300, 0x0500, &[1]);

        let range = request(v2::ST_EXT_WIDTH_CONTROL, RequestKind::Range, &[]);
        let response = handle(&mut transport, &extender, &range).unwrap();
        assert_eq!(&response.data[..], &[1, 0, 0, 255, 1]);
    }

    #[test]
    fn absent_bit_is_not_supported() {
        let mut transport = ReplayTransport::default();
        let chorus = unit(ProcessKind::Chorus, 0b0001);
        let depth = request(v2::MD_DEPTH_CONTROL, RequestKind::Current, &[]);
        assert!(matches!(
            handle(&mut transport, &chorus, &depth),
            Err(DispatchError::NotSupported { .. })
        ));
    }

    #[test]
    fn memory_is_forwarded() {
        let mut transport = ReplayTransport::default();
        let extension = ExtensionUnit {
            extension_code: 0x1234,
            sources: smallvec![2],
            cluster: ChannelCluster::default(),
            controls: smallvec![0b1],
        };
        let write = request(0x00, RequestKind::Memory, &[9, 8, 7]);
        let response = handle_extension(&mut transport, &extension, &write).unwrap();
        assert_eq!(response.bytes_transferred, 3);

        let sent = &transport.requests()[0];
        assert_eq!(sent.request, v1::SET_MEM);
        assert_eq!(sent.value, 0);
        assert_eq!(sent.data, vec![9, 8, 7]);
    }
}
