//! Reads USB Audio 1.0 (and MIDI 1.0) class-specific descriptors into [Entity] records.
//!
//! The input is whatever the device returned for its configuration, so nothing in it is trusted:
//! every record is bounds checked against both its own bLength and the end of the buffer before
//! a single field is read.

use plain::Plain;
use smallvec::SmallVec;

use crate::entity::{
    ChannelCluster, Entity, EntityKind, EntityList, ExtensionUnit, FeatureUnit, InputTerminal,
    MidiElement, MidiInJack, MidiOutJack, MidiPin, MixerUnit, OutputTerminal, ProcessKind,
    ProcessingUnit, SelectorUnit, SourceIds,
};
use crate::error::ParseError;
use crate::uac::{self, midi, v1};
use crate::usb::{DescriptorKind, InterfaceDescriptor};

/// One record of a descriptor chain.
#[derive(Clone, Copy, Debug)]
pub struct Descriptor<'a> {
    /// Offset of the record from the start of the walked buffer.
    pub offset: usize,
    /// The whole record, `bytes.len() == bLength >= 2`.
    pub bytes: &'a [u8],
}

impl<'a> Descriptor<'a> {
    pub fn length(&self) -> usize {
        self.bytes.len()
    }

    /// bDescriptorType
    pub fn kind(&self) -> u8 {
        self.bytes[1]
    }

    /// bDescriptorSubtype, for class-specific records.
    pub fn subtype(&self) -> Option<u8> {
        self.bytes.get(2).copied()
    }

    pub fn is(&self, kind: DescriptorKind) -> bool {
        self.kind() == kind as u8
    }

    /// A cursor over the record, positioned at byte `start`.
    pub fn cursor(&self, start: usize) -> Cursor<'a> {
        Cursor {
            bytes: self.bytes,
            position: start,
            offset: self.offset,
        }
    }

    /// Reads the record as one of the fixed-layout standard descriptors.
    pub fn read<T: Plain + Copy>(&self) -> Result<T, ParseError> {
        plain::from_bytes::<T>(self.bytes)
            .map(|desc| *desc)
            .map_err(|_| ParseError::Truncated {
                offset: self.offset,
                needed: std::mem::size_of::<T>(),
                available: self.bytes.len(),
            })
    }
}

/// Iterates over the `[bLength][bDescriptorType][...]` records of a buffer.
///
/// Yields an error, then stops, on a zero length or a record running past the buffer end.
pub struct DescriptorIter<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> DescriptorIter<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }
}

impl<'a> From<&'a [u8]> for DescriptorIter<'a> {
    fn from(slice: &'a [u8]) -> Self {
        Self::new(slice)
    }
}

impl<'a> Iterator for DescriptorIter<'a> {
    type Item = Result<Descriptor<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.bytes.is_empty() {
            return None;
        }

        let length = usize::from(self.bytes[0]);
        let error = if length == 0 {
            Some(ParseError::ZeroLength {
                offset: self.offset,
            })
        } else if length == 1 {
            Some(ParseError::UnknownRequiredField {
                offset: self.offset,
                field: "bLength",
            })
        } else if length > self.bytes.len() {
            Some(ParseError::Truncated {
                offset: self.offset,
                needed: length,
                available: self.bytes.len(),
            })
        } else {
            None
        };
        if let Some(error) = error {
            self.failed = true;
            return Some(Err(error));
        }

        let (record, rest) = self.bytes.split_at(length);
        let desc = Descriptor {
            offset: self.offset,
            bytes: record,
        };
        self.bytes = rest;
        self.offset += length;
        Some(Ok(desc))
    }
}

/// Little-endian field reader bounded by one record.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8], offset: usize) -> Self {
        Self {
            bytes,
            position: 0,
            offset,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    pub fn take(&mut self, count: usize) -> Result<&'a [u8], ParseError> {
        let end = self.position.checked_add(count).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let bytes = &self.bytes[self.position..end];
                self.position = end;
                Ok(bytes)
            }
            None => Err(ParseError::Truncated {
                offset: self.offset,
                needed: self.position.saturating_add(count),
                available: self.bytes.len(),
            }),
        }
    }

    pub fn u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, ParseError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// The three-byte sampling frequencies of the Audio 1.0 format descriptors.
    pub fn u24(&mut self) -> Result<u32, ParseError> {
        let bytes = self.take(3)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }

    pub fn u32(&mut self) -> Result<u32, ParseError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// A little-endian bitmap of `size` bytes, folded into a u32. Only the first four bytes are
    /// kept.
    pub fn bitmap(&mut self, size: usize) -> Result<u32, ParseError> {
        let bytes = self.take(size)?;
        Ok(bytes
            .iter()
            .take(4)
            .enumerate()
            .fold(0, |bits, (i, byte)| bits | u32::from(*byte) << (8 * i)))
    }

    fn sources(&mut self, count: usize) -> Result<SourceIds, ParseError> {
        Ok(self.take(count)?.iter().copied().collect())
    }

    fn midi_pins(&mut self, count: usize) -> Result<SmallVec<[MidiPin; 2]>, ParseError> {
        let bytes = self.take(count * 2)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| MidiPin {
                id: pair[0],
                pin: pair[1],
            })
            .collect())
    }

    /// bNrChannels, wChannelConfig, iChannelNames.
    fn cluster(&mut self) -> Result<ChannelCluster, ParseError> {
        Ok(ChannelCluster {
            channels: self.u8()?,
            config: u32::from(self.u16()?),
            names_str: self.u8()?,
        })
    }

    fn unknown(&self, field: &'static str) -> ParseError {
        ParseError::UnknownRequiredField {
            offset: self.offset,
            field,
        }
    }
}

/// The Audio Control class-specific header (UAC1 4.3.2).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ControlHeader {
    /// bcdADC
    pub adc: u16,
    /// wTotalLength of the class-specific Audio Control records, header included.
    pub total_length: u16,
    /// baInterfaceNr: the Audio Streaming and MIDI Streaming interfaces of this function.
    pub streaming_interfaces: SmallVec<[u8; 4]>,
}

pub fn parse_control_header(desc: &Descriptor) -> Result<ControlHeader, ParseError> {
    let mut cursor = desc.cursor(3);
    let adc = cursor.u16()?;
    let total_length = cursor.u16()?;
    let count = usize::from(cursor.u8()?);
    Ok(ControlHeader {
        adc,
        total_length,
        streaming_interfaces: cursor.take(count)?.iter().copied().collect(),
    })
}

/// The MIDI Streaming class-specific header (MIDI 6.1.2.1): bcdMSC and wTotalLength.
pub fn parse_midi_header(desc: &Descriptor) -> Result<(u16, u16), ParseError> {
    let mut cursor = desc.cursor(3);
    Ok((cursor.u16()?, cursor.u16()?))
}

fn entity(
    desc: &Descriptor,
    id: u8,
    interface_number: u8,
    string_index: u8,
    kind: EntityKind,
) -> Result<Entity, ParseError> {
    if id == 0 {
        return Err(ParseError::UnknownRequiredField {
            offset: desc.offset,
            field: "entity id",
        });
    }
    Ok(Entity {
        id,
        descriptor_subtype: desc.bytes[2],
        interface_number,
        string_index,
        kind,
    })
}

/// Instantiates the entity described by one Audio Control class-specific record.
///
/// Returns `Ok(None)` for the header and for subtypes this reader does not know.
pub fn parse_control_entity(
    desc: &Descriptor,
    interface_number: u8,
) -> Result<Option<Entity>, ParseError> {
    let subtype = match desc.subtype() {
        Some(subtype) => subtype,
        None => {
            return Err(ParseError::Truncated {
                offset: desc.offset,
                needed: 3,
                available: desc.length(),
            })
        }
    };
    let mut cursor = desc.cursor(3);

    let entity = match subtype {
        v1::HEADER => return Ok(None),
        v1::INPUT_TERMINAL => {
            let id = cursor.u8()?;
            let terminal_type = cursor.u16()?;
            let assoc_terminal = cursor.u8()?;
            let cluster = cursor.cluster()?;
            let string_index = cursor.u8()?;
            let kind = EntityKind::InputTerminal(InputTerminal {
                terminal_type,
                assoc_terminal,
                cluster,
                clock_id: None,
            });
            entity(desc, id, interface_number, string_index, kind)?
        }
        v1::OUTPUT_TERMINAL => {
            let id = cursor.u8()?;
            let terminal_type = cursor.u16()?;
            let assoc_terminal = cursor.u8()?;
            let source_id = cursor.u8()?;
            let string_index = cursor.u8()?;
            let kind = EntityKind::OutputTerminal(OutputTerminal {
                terminal_type,
                assoc_terminal,
                source_id,
                clock_id: None,
            });
            entity(desc, id, interface_number, string_index, kind)?
        }
        v1::MIXER_UNIT => {
            let id = cursor.u8()?;
            let pins = usize::from(cursor.u8()?);
            let sources = cursor.sources(pins)?;
            let cluster = cursor.cluster()?;
            // Whatever lies between the cluster and the trailing iMixer is bmControls.
            let control_size = cursor
                .remaining()
                .checked_sub(1)
                .ok_or_else(|| cursor.unknown("bNrInPins"))?;
            let controls = cursor.take(control_size)?.iter().copied().collect();
            let string_index = cursor.u8()?;
            let kind = EntityKind::Mixer(MixerUnit {
                sources,
                cluster,
                controls,
            });
            entity(desc, id, interface_number, string_index, kind)?
        }
        v1::SELECTOR_UNIT => {
            let id = cursor.u8()?;
            let pins = usize::from(cursor.u8()?);
            let sources = cursor.sources(pins)?;
            let string_index = cursor.u8()?;
            entity(
                desc,
                id,
                interface_number,
                string_index,
                EntityKind::Selector(SelectorUnit { sources }),
            )?
        }
        v1::FEATURE_UNIT => {
            let id = cursor.u8()?;
            let source_id = cursor.u8()?;
            let control_size = usize::from(cursor.u8()?);
            if control_size == 0 {
                return Err(cursor.unknown("bControlSize"));
            }
            let channels = cursor
                .remaining()
                .checked_sub(1)
                .map(|size| size / control_size)
                .filter(|channels| *channels > 0)
                .ok_or_else(|| cursor.unknown("bmaControls"))?;
            let controls = (0..channels)
                .map(|_| cursor.bitmap(control_size))
                .collect::<Result<_, _>>()?;
            let string_index = cursor.u8()?;
            let kind = EntityKind::Feature(FeatureUnit {
                source_id,
                controls,
            });
            entity(desc, id, interface_number, string_index, kind)?
        }
        v1::PROCESSING_UNIT => {
            let id = cursor.u8()?;
            let process_type = cursor.u16()?;
            let pins = usize::from(cursor.u8()?);
            let sources = cursor.sources(pins)?;
            let cluster = cursor.cluster()?;
            let control_size = usize::from(cursor.u8()?);
            let controls = cursor.take(control_size)?.iter().copied().collect();
            let string_index = cursor.u8()?;
            let kind = match process_type {
                v1::UP_DOWNMIX_PROCESS | v1::DOLBY_PROLOGIC_PROCESS => {
                    let count = usize::from(cursor.u8()?);
                    let modes = (0..count)
                        .map(|_| cursor.u16())
                        .collect::<Result<SmallVec<_>, _>>()?;
                    if process_type == v1::UP_DOWNMIX_PROCESS {
                        ProcessKind::UpDownMix { modes }
                    } else {
                        ProcessKind::DolbyPrologic { modes }
                    }
                }
                v1::STEREO_EXTENDER_PROCESS => ProcessKind::StereoExtender,
                v1::REVERBERATION_PROCESS => ProcessKind::Reverberation,
                v1::CHORUS_PROCESS => ProcessKind::Chorus,
                v1::DYN_RANGE_COMP_PROCESS => ProcessKind::DynamicRangeCompression,
                other => {
                    log::debug!("processing unit {} has vendor process type {:#x}", id, other);
                    let rest = cursor.remaining();
                    ProcessKind::Unknown {
                        specific: cursor.take(rest)?.to_vec(),
                    }
                }
            };
            let kind = EntityKind::Processing(ProcessingUnit {
                process_type,
                sources,
                cluster,
                controls,
                kind,
            });
            entity(desc, id, interface_number, string_index, kind)?
        }
        v1::EXTENSION_UNIT => {
            let id = cursor.u8()?;
            let extension_code = cursor.u16()?;
            let pins = usize::from(cursor.u8()?);
            let sources = cursor.sources(pins)?;
            let cluster = cursor.cluster()?;
            let control_size = usize::from(cursor.u8()?);
            let controls = cursor.take(control_size)?.iter().copied().collect();
            let string_index = cursor.u8()?;
            let kind = EntityKind::Extension(ExtensionUnit {
                extension_code,
                sources,
                cluster,
                controls,
            });
            entity(desc, id, interface_number, string_index, kind)?
        }
        other => {
            log::debug!(
                "skipping audio control descriptor subtype {:#x} at offset {}",
                other,
                desc.offset
            );
            return Ok(None);
        }
    };
    Ok(Some(entity))
}

/// Instantiates the jack or element described by one MIDI Streaming class-specific record.
pub fn parse_midi_entity(
    desc: &Descriptor,
    interface_number: u8,
) -> Result<Option<Entity>, ParseError> {
    let mut cursor = desc.cursor(3);
    let entity = match desc.subtype() {
        Some(midi::MS_HEADER) => return Ok(None),
        Some(midi::MIDI_IN_JACK) => {
            let jack_type = cursor.u8()?;
            let id = cursor.u8()?;
            let string_index = cursor.u8()?;
            let kind = EntityKind::MidiInJack(MidiInJack { jack_type });
            entity(desc, id, interface_number, string_index, kind)?
        }
        Some(midi::MIDI_OUT_JACK) => {
            let jack_type = cursor.u8()?;
            let id = cursor.u8()?;
            let pins = usize::from(cursor.u8()?);
            let sources = cursor.midi_pins(pins)?;
            let string_index = cursor.u8()?;
            let kind = EntityKind::MidiOutJack(MidiOutJack { jack_type, sources });
            entity(desc, id, interface_number, string_index, kind)?
        }
        Some(midi::ELEMENT) => {
            let id = cursor.u8()?;
            let pins = usize::from(cursor.u8()?);
            let sources = cursor.midi_pins(pins)?;
            let output_pins = cursor.u8()?;
            let in_terminal = cursor.u8()?;
            let out_terminal = cursor.u8()?;
            let caps_size = usize::from(cursor.u8()?);
            let capabilities = cursor.take(caps_size)?.iter().copied().collect();
            let string_index = cursor.u8()?;
            let kind = EntityKind::MidiElement(MidiElement {
                sources,
                output_pins,
                in_terminal,
                out_terminal,
                capabilities,
            });
            entity(desc, id, interface_number, string_index, kind)?
        }
        other => {
            log::debug!(
                "skipping MIDI streaming descriptor subtype {:?} at offset {}",
                other,
                desc.offset
            );
            return Ok(None);
        }
    };
    Ok(Some(entity))
}

/// Parses the entities of an Audio Control or MIDI Streaming interface.
///
/// `buffer` normally starts with the standard interface descriptor, which selects how the
/// class-specific records after it are read. Records before any interface descriptor are read as
/// Audio Control records of interface 0. Class-specific records past the `wTotalLength` declared
/// by the interface header are ignored; the region ends at the lesser of that length and the end
/// of the buffer.
///
/// Every source reference must resolve within the returned list.
pub fn parse(buffer: &[u8]) -> Result<EntityList, ParseError> {
    let mut entities = EntityList::new();
    let mut interface_number = 0;
    let mut subclass = uac::SUBCLASS_AUDIO_CONTROL;
    let mut class_end = buffer.len();

    for desc in DescriptorIter::new(buffer) {
        let desc = desc?;

        if desc.is(DescriptorKind::Interface) {
            let iface = desc.read::<InterfaceDescriptor>()?;
            interface_number = iface.number;
            subclass = if iface.class == uac::CLASS_AUDIO {
                iface.sub_class
            } else {
                0
            };
            class_end = buffer.len();
            continue;
        }
        if !desc.is(DescriptorKind::ClassInterface) {
            continue;
        }
        if desc.offset + desc.length() > class_end {
            log::debug!(
                "descriptor at offset {} lies past the declared class-specific length",
                desc.offset
            );
            continue;
        }

        let entity = match (subclass, desc.subtype()) {
            (uac::SUBCLASS_AUDIO_CONTROL, Some(v1::HEADER)) => {
                let header = parse_control_header(&desc)?;
                class_end = clamp_region(&desc, header.total_length, buffer.len());
                None
            }
            (uac::SUBCLASS_AUDIO_CONTROL, _) => parse_control_entity(&desc, interface_number)?,
            (uac::SUBCLASS_MIDI_STREAMING, Some(midi::MS_HEADER)) => {
                let (_, total_length) = parse_midi_header(&desc)?;
                class_end = clamp_region(&desc, total_length, buffer.len());
                None
            }
            (uac::SUBCLASS_MIDI_STREAMING, _) => parse_midi_entity(&desc, interface_number)?,
            _ => None,
        };
        if let Some(entity) = entity {
            entities.push(entity)?;
        }
    }

    entities.validate_references()?;
    Ok(entities)
}

fn clamp_region(header: &Descriptor, total_length: u16, buffer_len: usize) -> usize {
    let declared = header.offset + usize::from(total_length);
    if declared > buffer_len {
        log::warn!(
            "class-specific header at offset {} declares {} bytes, only {} remain",
            header.offset,
            total_length,
            buffer_len - header.offset
        );
    }
    declared.min(buffer_len)
}

#[cfg(test)]
mod test {
    use super::*;

    const AC_INTERFACE: [u8; 9] = [9, 4, 0, 0, 0, 1, 1, 0, 0];

    fn header(total_length: u16) -> Vec<u8> {
        let [lo, hi] = total_length.to_le_bytes();
        vec![9, 0x24, 1, 0x00, 0x01, lo, hi, 1, 1]
    }

    fn input_terminal(id: u8) -> Vec<u8> {
        vec![12, 0x24, 2, id, 0x01, 0x02, 0, 2, 0x03, 0x00, 0, 0]
    }

    fn feature_unit(id: u8, source: u8) -> Vec<u8> {
        // One byte per channel: master mute + volume, no per-channel controls.
        vec![10, 0x24, 6, id, source, 1, 0x03, 0x00, 0x00, 0]
    }

    fn output_terminal(id: u8, source: u8) -> Vec<u8> {
        vec![9, 0x24, 3, id, 0x01, 0x03, 0, source, 0]
    }

    fn control_interface(records: &[Vec<u8>]) -> Vec<u8> {
        let body: usize = records.iter().map(Vec::len).sum();
        let mut buffer = AC_INTERFACE.to_vec();
        buffer.extend(header((9 + body) as u16));
        for record in records {
            buffer.extend(record);
        }
        buffer
    }

    #[test]
    fn zero_length_record() {
        let buffer = [9, 4, 0, 0, 0, 1, 1, 0, 0, 0, 0x24];
        assert_eq!(parse(&buffer), Err(ParseError::ZeroLength { offset: 9 }));
    }

    #[test]
    fn record_past_buffer_end() {
        let mut buffer = control_interface(&[input_terminal(1)]);
        buffer.truncate(buffer.len() - 2);
        assert_eq!(
            parse(&buffer),
            Err(ParseError::Truncated {
                offset: 18,
                needed: 12,
                available: 10
            })
        );
    }

    #[test]
    fn linear_topology() {
        let buffer = control_interface(&[
            input_terminal(1),
            feature_unit(2, 1),
            output_terminal(3, 2),
        ]);
        let entities = parse(&buffer).unwrap();
        assert_eq!(entities.len(), 3);

        match &entities.get(2).unwrap().kind {
            EntityKind::Feature(unit) => {
                assert_eq!(unit.source_id, 1);
                assert_eq!(unit.controls.as_slice(), &[0x03, 0x00, 0x00]);
                assert!(unit.find_control(0, 0));
                assert!(unit.find_control(0, 1));
                assert!(!unit.find_control(1, 1));
            }
            other => panic!("expected a feature unit, got {:?}", other),
        }
        match &entities.get(1).unwrap().kind {
            EntityKind::InputTerminal(it) => {
                assert_eq!(it.terminal_type, 0x0201);
                assert_eq!(it.cluster.channels, 2);
                assert_eq!(it.cluster.config, 3);
            }
            other => panic!("expected an input terminal, got {:?}", other),
        }
    }

    #[test]
    fn unknown_subtype_is_skipped() {
        let buffer = control_interface(&[vec![5, 0x24, 0x0F, 7, 7], input_terminal(1)]);
        let entities = parse(&buffer).unwrap();
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn dangling_source_is_rejected() {
        let buffer = control_interface(&[output_terminal(3, 9)]);
        assert_eq!(
            parse(&buffer),
            Err(ParseError::DanglingReference {
                entity: 3,
                missing: 9
            })
        );
    }

    #[test]
    fn mixer_bitmap_between_cluster_and_string() {
        let mixer = vec![13, 0x24, 4, 4, 2, 1, 1, 2, 0x03, 0x00, 0, 0b1001_0000, 0];
        let buffer = control_interface(&[input_terminal(1), mixer]);
        let entities = parse(&buffer).unwrap();
        match &entities.get(4).unwrap().kind {
            EntityKind::Mixer(unit) => {
                assert_eq!(unit.sources.as_slice(), &[1, 1]);
                assert_eq!(unit.cluster.channels, 2);
                assert_eq!(unit.controls.as_slice(), &[0b1001_0000]);
            }
            other => panic!("expected a mixer unit, got {:?}", other),
        }
    }

    #[test]
    fn up_down_mix_modes() {
        let unit = vec![
            20, 0x24, 7, 5, 0x01, 0x00, 1, 1, 2, 0x03, 0x00, 0, 1, 0b11, 0, 2, 0x03, 0x00, 0x00,
            0x3F,
        ];
        let buffer = control_interface(&[input_terminal(1), unit.clone()]);
        let entities = parse(&buffer).unwrap();
        match &entities.get(5).unwrap().kind {
            EntityKind::Processing(unit) => {
                assert_eq!(unit.process_type, v1::UP_DOWNMIX_PROCESS);
                assert!(unit.find_control(0));
                assert!(unit.find_control(1));
                assert_eq!(
                    unit.kind,
                    ProcessKind::UpDownMix {
                        modes: smallvec::smallvec![0x0003, 0x3F00]
                    }
                );
            }
            other => panic!("expected a processing unit, got {:?}", other),
        }

        // bNrModes says two, bLength leaves room for one.
        let mut short = unit[..18].to_vec();
        short[0] = 18;
        let buffer = control_interface(&[input_terminal(1), short]);
        assert!(matches!(parse(&buffer), Err(ParseError::Truncated { .. })));
    }

    #[test]
    fn declared_total_length_is_clamped() {
        let mut buffer = AC_INTERFACE.to_vec();
        buffer.extend(header(0x0400));
        buffer.extend(input_terminal(1));
        let entities = parse(&buffer).unwrap();
        assert_eq!(entities.len(), 1);

        // A header declaring less than it has hides the records after it.
        let mut buffer = AC_INTERFACE.to_vec();
        buffer.extend(header(9));
        buffer.extend(input_terminal(1));
        assert!(parse(&buffer).unwrap().is_empty());
    }

    #[test]
    fn midi_jacks() {
        let mut buffer = vec![9, 4, 1, 0, 2, 1, 3, 0, 0];
        buffer.extend([7, 0x24, 1, 0x00, 0x01, 0x1F, 0x00]);
        buffer.extend([6, 0x24, 2, 1, 1, 0]);
        buffer.extend([9, 0x24, 3, 2, 2, 1, 1, 1, 0]);
        buffer.extend([9, 0x24, 3, 2, 3, 1, 2, 1, 0]);
        let entities = parse(&buffer).unwrap();
        assert_eq!(entities.len(), 3);
        let jack = entities.get(3).unwrap();
        assert_eq!(jack.interface_number, 1);
        assert_eq!(jack.source_ids().as_slice(), &[2]);
    }
}
