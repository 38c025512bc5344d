use serde::Serialize;
use smallvec::SmallVec;

use crate::error::ParseError;
use crate::reader::Descriptor;
use crate::uac;
use crate::usb::{EndpointDescriptor, EndpointTy, ENDP_ATTR_USAGE_MASK};

bitflags::bitflags! {
    /// bmAttributes of the Audio 1.0 class-specific isochronous endpoint (UAC1 4.6.1.2).
    #[derive(Default)]
    pub struct AsEndpointControls: u8 {
        const SAMPLING_FREQUENCY = 1 << 0;
        const PITCH = 1 << 1;
        const MAX_PACKETS_ONLY = 1 << 7;
    }
}

/// The class-specific record following an audio or MIDI endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ClassEndpoint {
    /// Audio 1.0 `EP_GENERAL`.
    Audio {
        attributes: u8,
        lock_delay_units: u8,
        lock_delay: u16,
    },
    /// MIDI `MS_GENERAL`: the embedded jacks behind the endpoint.
    Midi { jacks: SmallVec<[u8; 4]> },
}

impl ClassEndpoint {
    pub fn parse_audio(desc: &Descriptor) -> Result<Self, ParseError> {
        let mut cursor = desc.cursor(3);
        Ok(Self::Audio {
            attributes: cursor.u8()?,
            lock_delay_units: cursor.u8()?,
            lock_delay: cursor.u16()?,
        })
    }

    pub fn parse_midi(desc: &Descriptor) -> Result<Self, ParseError> {
        let mut cursor = desc.cursor(3);
        let count = usize::from(cursor.u8()?);
        Ok(Self::Midi {
            jacks: cursor.take(count)?.iter().copied().collect(),
        })
    }

    pub fn controls(&self) -> AsEndpointControls {
        match self {
            Self::Audio { attributes, .. } => AsEndpointControls::from_bits_truncate(*attributes),
            Self::Midi { .. } => AsEndpointControls::empty(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum EndpointKind {
    /// Audio Control status interrupt endpoint.
    ControlInterrupt,
    /// Audio Streaming isochronous data endpoint.
    StreamingData,
    /// Audio Streaming isochronous feedback (synch) endpoint.
    StreamingFeedback,
    /// MIDI Streaming bulk data endpoint.
    MidiData,
    Other,
}

/// One endpoint of an alternate setting, with its class-specific record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UsbEndpoint {
    pub address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
    /// bRefresh of the 9-byte audio endpoint layout.
    pub refresh: u8,
    /// bSynchAddress of the 9-byte audio endpoint layout.
    pub synch_address: u8,
    pub kind: EndpointKind,
    pub class: Option<ClassEndpoint>,
}

impl UsbEndpoint {
    pub fn parse(desc: &Descriptor) -> Result<Self, ParseError> {
        let standard = desc.read::<EndpointDescriptor>()?;
        let (refresh, synch_address) = match desc.bytes.get(7..9) {
            Some(extra) => (extra[0], extra[1]),
            None => (0, 0),
        };
        Ok(Self {
            address: standard.address,
            attributes: standard.attributes,
            max_packet_size: standard.max_packet_size,
            interval: standard.interval,
            refresh,
            synch_address,
            kind: EndpointKind::Other,
            class: None,
        })
    }

    pub fn ty(&self) -> EndpointTy {
        self.descriptor().ty()
    }

    pub fn is_in(&self) -> bool {
        self.descriptor().is_in()
    }

    fn descriptor(&self) -> EndpointDescriptor {
        EndpointDescriptor {
            length: EndpointDescriptor::SIZE as u8,
            kind: 5,
            address: self.address,
            attributes: self.attributes,
            max_packet_size: self.max_packet_size,
            interval: self.interval,
        }
    }

    /// Classifies the endpoint by its interface subclass. `synch_addresses` lists the bSynchAddress
    /// of every endpoint of the same alternate setting, since Audio 1.0 feedback endpoints are only
    /// recognizable by being pointed at.
    pub(crate) fn classify(&mut self, sub_class: u8, synch_addresses: &[u8]) {
        self.kind = match (sub_class, self.ty()) {
            (uac::SUBCLASS_AUDIO_CONTROL, EndpointTy::Interrupt) => {
                EndpointKind::ControlInterrupt
            }
            (uac::SUBCLASS_AUDIO_STREAMING, EndpointTy::Isoch) => {
                let feedback_usage = self.attributes & ENDP_ATTR_USAGE_MASK == 0x10;
                if feedback_usage || synch_addresses.contains(&self.address) {
                    EndpointKind::StreamingFeedback
                } else {
                    EndpointKind::StreamingData
                }
            }
            (uac::SUBCLASS_MIDI_STREAMING, EndpointTy::Bulk) => EndpointKind::MidiData,
            _ => EndpointKind::Other,
        };
    }

    /// Whether the endpoint accepts the Audio 1.0 sampling frequency control.
    pub fn has_sampling_frequency_control(&self) -> bool {
        self.kind == EndpointKind::StreamingData
            && self
                .class
                .as_ref()
                .map(|class| class.controls().contains(AsEndpointControls::SAMPLING_FREQUENCY))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reader::DescriptorIter;

    fn endpoint(bytes: &[u8]) -> UsbEndpoint {
        let desc = DescriptorIter::new(bytes).next().unwrap().unwrap();
        UsbEndpoint::parse(&desc).unwrap()
    }

    #[test]
    fn feedback_by_synch_address() {
        let mut data = endpoint(&[9, 5, 0x01, 0x05, 0xC0, 0x00, 1, 0, 0x82]);
        let mut sync = endpoint(&[9, 5, 0x82, 0x01, 0x03, 0x00, 1, 5, 0]);
        let synch = [data.synch_address, sync.synch_address];
        data.classify(uac::SUBCLASS_AUDIO_STREAMING, &synch);
        sync.classify(uac::SUBCLASS_AUDIO_STREAMING, &synch);
        assert_eq!(data.kind, EndpointKind::StreamingData);
        assert_eq!(sync.kind, EndpointKind::StreamingFeedback);
        assert_eq!(sync.refresh, 5);
        assert!(sync.is_in());
    }

    #[test]
    fn sampling_frequency_control() {
        let mut data = endpoint(&[9, 5, 0x01, 0x09, 0xC0, 0x00, 1, 0, 0]);
        data.classify(uac::SUBCLASS_AUDIO_STREAMING, &[]);
        assert!(!data.has_sampling_frequency_control());

        let bytes = [7, 0x25, 1, 0x81, 0, 0, 0];
        let desc = DescriptorIter::new(&bytes).next().unwrap().unwrap();
        data.class = Some(ClassEndpoint::parse_audio(&desc).unwrap());
        assert!(data.has_sampling_frequency_control());
        assert!(data
            .class
            .as_ref()
            .unwrap()
            .controls()
            .contains(AsEndpointControls::MAX_PACKETS_ONLY));
    }
}
