use smallvec::SmallVec;

use super::{forward, ControlRequest, ControlResponse, Direction, Mapping, RequestKind};
use crate::entity::FeatureUnit;
use crate::error::{DispatchError, TransportError};
use crate::requests::LegacyControl;
use crate::transport::DeviceTransport;
use crate::uac::{v1, v2};

/// Bands a graphic equalizer can report: bmBandsPresent plus one byte per band.
const EQUALIZER_BANDS: usize = 32;

/// Audio 2.0 feature selectors 1 to 10 keep their Audio 1.0 numbers. Delay grew from two bytes
/// to four.
fn mapping(selector: u8) -> Option<Mapping> {
    Some(match selector {
        v2::FU_MUTE_CONTROL => Mapping::new(v1::MUTE_CONTROL, 1, false),
        v2::FU_VOLUME_CONTROL => Mapping::new(v1::VOLUME_CONTROL, 2, true),
        v2::FU_BASS_CONTROL => Mapping::new(v1::BASS_CONTROL, 1, true),
        v2::FU_MID_CONTROL => Mapping::new(v1::MID_CONTROL, 1, true),
        v2::FU_TREBLE_CONTROL => Mapping::new(v1::TREBLE_CONTROL, 1, true),
        v2::FU_AUTOMATIC_GAIN_CONTROL => Mapping::new(v1::AUTOMATIC_GAIN_CONTROL, 1, false),
        v2::FU_DELAY_CONTROL => Mapping::widened(v1::DELAY_CONTROL, 2, 4),
        v2::FU_BASS_BOOST_CONTROL => Mapping::new(v1::BASS_BOOST_CONTROL, 1, false),
        v2::FU_LOUDNESS_CONTROL => Mapping::new(v1::LOUDNESS_CONTROL, 1, false),
        _ => return None,
    })
}

pub(super) fn handle<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    unit: &FeatureUnit,
    request: &ControlRequest,
) -> Result<ControlResponse, DispatchError> {
    let selector = request.control_selector;
    if !(v2::FU_MUTE_CONTROL..=v2::FU_LOUDNESS_CONTROL).contains(&selector)
        || request.request_kind == RequestKind::Memory
    {
        return Err(request.not_supported());
    }
    if request.channel > unit.channels() {
        return Err(DispatchError::InvalidRequest("channel out of range"));
    }
    if !unit.find_control(request.channel, selector - 1) {
        return Err(request.not_supported());
    }

    let legacy = request.legacy(selector, request.channel);
    match mapping(selector) {
        Some(mapping) => forward(transport, request, legacy, mapping),
        None => equalizer(transport, request, legacy),
    }
}

/// The graphic equalizer value is bmBandsPresent followed by one byte per present band, in
/// both releases.
fn equalizer<T: DeviceTransport + ?Sized>(
    transport: &mut T,
    request: &ControlRequest,
    legacy: LegacyControl,
) -> Result<ControlResponse, DispatchError> {
    match (request.request_kind, request.direction) {
        (RequestKind::Current, Direction::Get) => {
            let mut value = [0u8; 4 + EQUALIZER_BANDS];
            let count = legacy.get(transport, v1::GET_CUR, &mut value)?;
            Ok(ControlResponse::get(request, &value[..count]))
        }
        (RequestKind::Current, Direction::Set) => {
            let bands = request.payload(4)?;
            let present = u32::from_le_bytes([bands[0], bands[1], bands[2], bands[3]]);
            let width = 4 + present.count_ones() as usize;
            let value = request.payload(width)?;
            legacy.set(transport, v1::SET_CUR, value)?;
            Ok(ControlResponse::set(width))
        }
        (RequestKind::Range, Direction::Get) => {
            // One sub-range of one-byte band gains, taken from the first present band.
            let mut range = SmallVec::<[u8; 16]>::new();
            range.extend_from_slice(&1u16.to_le_bytes());
            for bound in [v1::GET_MIN, v1::GET_MAX, v1::GET_RES] {
                let mut value = [0u8; 4 + EQUALIZER_BANDS];
                let count = legacy.get(transport, bound, &mut value)?;
                if count < 5 {
                    return Err(TransportError::ShortTransfer {
                        expected: 5,
                        actual: count,
                    }
                    .into());
                }
                range.push(value[4]);
            }
            Ok(ControlResponse::get(request, &range))
        }
        (RequestKind::Range, Direction::Set) => {
            Err(DispatchError::InvalidRequest("RANGE is read-only"))
        }
        (RequestKind::Memory, _) => Err(request.not_supported()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transport::ReplayTransport;
    use smallvec::smallvec;

    fn unit() -> FeatureUnit {
        FeatureUnit {
            source_id: 1,
            // Master: mute, volume, delay. Channel 1: volume, graphic equalizer.
            controls: smallvec![0x0083, 0x0022],
        }
    }

    fn request(selector: u8, channel: u8, direction: Direction, payload: &[u8]) -> ControlRequest {
        ControlRequest {
            interface_number: 0,
            entity_id: 2,
            control_selector: selector,
            channel,
            direction,
            request_kind: RequestKind::Current,
            payload,
            length: 8,
        }
    }

    #[test]
    fn mute_round_trip() {
        let mut transport = ReplayTransport::default();
        let set = request(v2::FU_MUTE_CONTROL, 0, Direction::Set, &[1]);
        assert_eq!(
            handle(&mut transport, &unit(), &set).unwrap().bytes_transferred,
            1
        );
        let get = request(v2::FU_MUTE_CONTROL, 0, Direction::Get, &[]);
        assert_eq!(&handle(&mut transport, &unit(), &get).unwrap().data[..], &[1]);
    }

    #[test]
    fn absent_and_unmapped_controls() {
        let mut transport = ReplayTransport::default();
        let bass = request(v2::FU_BASS_CONTROL, 0, Direction::Get, &[]);
        let input_gain = request(v2::FU_INPUT_GAIN_CONTROL, 0, Direction::Get, &[]);
        for request in [bass, input_gain] {
            assert!(matches!(
                handle(&mut transport, &unit(), &request),
                Err(DispatchError::NotSupported { entity: 2, .. })
            ));
        }

        let channel = request(v2::FU_VOLUME_CONTROL, 2, Direction::Get, &[]);
        assert!(matches!(
            handle(&mut transport, &unit(), &channel),
            Err(DispatchError::InvalidRequest(_))
        ));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn short_payload() {
        let mut transport = ReplayTransport::default();
        let set = request(v2::FU_VOLUME_CONTROL, 1, Direction::Set, &[0x10]);
        assert_eq!(
            handle(&mut transport, &unit(), &set),
            Err(DispatchError::BufferTooSmall {
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn delay_is_widened() {
        let mut transport = ReplayTransport::default();
        transport.set_control(v1::GET_CUR, 0x0800, 0x0200, &[0x40, 0x01]);
        let get = request(v2::FU_DELAY_CONTROL, 0, Direction::Get, &[]);
        assert_eq!(
            &handle(&mut transport, &unit(), &get).unwrap().data[..],
            &[0x40, 0x01, 0, 0]
        );

        let too_long = request(v2::FU_DELAY_CONTROL, 0, Direction::Set, &[0, 0, 1, 0]);
        assert!(matches!(
            handle(&mut transport, &unit(), &too_long),
            Err(DispatchError::InvalidRequest(_))
        ));

        let set = request(v2::FU_DELAY_CONTROL, 0, Direction::Set, &[0x80, 0, 0, 0]);
        handle(&mut transport, &unit(), &set).unwrap();
        assert_eq!(transport.requests().last().unwrap().data, vec![0x80, 0]);
    }

    #[test]
    fn boolean_controls_have_no_range() {
        let mut transport = ReplayTransport::default();
        let mut range = request(v2::FU_MUTE_CONTROL, 0, Direction::Get, &[]);
        range.request_kind = RequestKind::Range;
        assert!(matches!(
            handle(&mut transport, &unit(), &range),
            Err(DispatchError::NotSupported { .. })
        ));
    }

    #[test]
    fn equalizer_set_uses_present_bands() {
        let mut transport = ReplayTransport::default();
        let payload = [0b101, 0, 0, 0, 0x10, 0x20, 0xFF];
        let set = request(v2::FU_GRAPHIC_EQUALIZER_CONTROL, 1, Direction::Set, &payload);
        assert_eq!(
            handle(&mut transport, &unit(), &set).unwrap().bytes_transferred,
            6
        );
        assert_eq!(transport.requests()[0].data, payload[..6].to_vec());
    }
}
