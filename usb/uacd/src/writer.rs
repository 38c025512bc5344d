//! Synthesis of USB Audio 2.0 descriptors.
//!
//! Every writable construct reports its size first and is written second. Containers, whose
//! headers carry the length of what follows, sum the sizes of their contents before writing the
//! header, so a wTotalLength is never estimated.

use crate::entity::{
    ChannelCluster, ClockMultiplier, ClockSelector, ClockSource, Entity, EntityKind, EntityList,
    ExtensionUnit, FeatureUnit, InputTerminal, MidiElement, MidiOutJack, MixerUnit,
    OutputTerminal, ProcessKind, ProcessingUnit, SelectorUnit,
};
use crate::error::WriteError;
use crate::model::{
    AlternateSetting, AsEndpointControls, ClassEndpoint, ControlSetting, EndpointKind,
    FormatDetails, FormatTypeDescriptor, MidiSetting, SettingKind, StreamingSetting,
    UsbConfiguration, UsbEndpoint, UsbInterface,
};
use crate::uac::{self, midi, v1, v2};
use crate::usb::{
    ConfigDescriptor, DescriptorKind, EndpointDescriptor, InterfaceAssociationDescriptor,
    InterfaceDescriptor, ENDP_ATTR_TY_MASK,
};

const CS_INTERFACE: u8 = DescriptorKind::ClassInterface as u8;
const CS_ENDPOINT: u8 = DescriptorKind::ClassEndpoint as u8;

/// Largest number of 4-byte bmaControls entries that keeps a Feature Unit under 256 bytes.
const MAX_FEATURE_ENTRIES: usize = (255 - 6) / 4;
/// Same bound for Effect Units.
const MAX_EFFECT_ENTRIES: usize = (255 - 8) / 4;

/// A bounded little-endian writer.
///
/// Writes past the end of the buffer are dropped and remembered; [DescriptorWriter::finish]
/// reports them.
pub struct DescriptorWriter<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> DescriptorWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if let Some(target) = self.buffer.get_mut(self.position..end) {
            target.copy_from_slice(bytes);
        }
        self.position = end;
    }

    pub fn u8(&mut self, value: u8) {
        self.bytes(&[value]);
    }

    pub fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    /// bLength, bDescriptorType, bDescriptorSubtype of a class-specific record.
    fn class_header(&mut self, length: usize, kind: u8, subtype: u8) {
        self.u8(length as u8);
        self.u8(kind);
        self.u8(subtype);
    }

    /// bNrChannels, bmChannelConfig, iChannelNames.
    fn cluster(&mut self, cluster: &ChannelCluster) {
        self.u8(cluster.channels);
        self.u32(cluster.config);
        self.u8(cluster.names_str);
    }

    pub fn finish(self) -> Result<usize, WriteError> {
        if self.position > self.buffer.len() {
            return Err(WriteError::BufferTooSmall {
                needed: self.position,
                available: self.buffer.len(),
            });
        }
        Ok(self.position)
    }
}

/// Something with a USB Audio 2.0 binary form.
pub trait Uac2Descriptor {
    /// Exact number of bytes [Uac2Descriptor::serialize_into] writes.
    fn serialized_size(&self) -> usize;

    fn write_to(&self, writer: &mut DescriptorWriter);

    /// Checks that every length field of the descriptor can hold what it counts.
    fn check_lengths(&self) -> Result<(), WriteError> {
        Ok(())
    }

    /// Writes the descriptor at the start of `buffer` and returns the number of bytes written.
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, WriteError> {
        self.check_lengths()?;
        let needed = self.serialized_size();
        if buffer.len() < needed {
            return Err(WriteError::BufferTooSmall {
                needed,
                available: buffer.len(),
            });
        }
        let mut writer = DescriptorWriter::new(&mut buffer[..needed]);
        self.write_to(&mut writer);
        writer.finish()
    }

    fn to_bytes(&self) -> Result<Vec<u8>, WriteError> {
        let mut bytes = vec![0; self.serialized_size()];
        let written = self.serialize_into(&mut bytes)?;
        bytes.truncate(written);
        Ok(bytes)
    }
}

/// Sets the two Audio 2.0 bits `2i+1:2i` of every Audio 1.0 control bit `i` below `count` that
/// `present` reports.
fn widen(count: u8, present: impl Fn(u8) -> bool) -> u32 {
    (0..count.min(16))
        .filter(|index| present(*index))
        .fold(0, |bits, index| {
            bits | u32::from(v2::CONTROL_PROGRAMMABLE) << (2 * index)
        })
}

fn feature_entries(unit: &FeatureUnit) -> usize {
    unit.controls.len().min(MAX_FEATURE_ENTRIES)
}

/// Master channel plus the logical channels of the cluster.
fn effect_entries(unit: &ProcessingUnit) -> usize {
    (usize::from(unit.cluster.channels) + 1).min(MAX_EFFECT_ENTRIES)
}

fn effect_type(kind: &ProcessKind) -> u16 {
    match kind {
        ProcessKind::Reverberation => v2::REVERBERATION_EFFECT,
        ProcessKind::Chorus => v2::MOD_DELAY_EFFECT,
        _ => v2::DYN_RANGE_COMP_EFFECT,
    }
}

/// Audio 1.0 bmControls bits of an effect, and the Audio 2.0 bits they map to. The bit positions
/// line up between releases; the reverberation type has no Audio 1.0 request and is left out.
fn effect_controls(unit: &ProcessingUnit) -> u32 {
    match unit.kind {
        ProcessKind::Reverberation => widen(5, |i| i != 1 && unit.find_control(i)),
        ProcessKind::Chorus => widen(4, |i| unit.find_control(i)),
        _ => widen(6, |i| unit.find_control(i)),
    }
}

/// Modes of an up/down-mix or Dolby Pro Logic unit that fit in one descriptor.
fn processing_modes(unit: &ProcessingUnit) -> &[u16] {
    match &unit.kind {
        ProcessKind::UpDownMix { modes } | ProcessKind::DolbyPrologic { modes } => {
            let room = (255 - 17usize).saturating_sub(unit.sources.len()) / 4;
            &modes[..modes.len().min(room)]
        }
        _ => &[],
    }
}

fn processing_specific_size(unit: &ProcessingUnit) -> usize {
    match &unit.kind {
        ProcessKind::UpDownMix { .. } | ProcessKind::DolbyPrologic { .. } => {
            1 + 4 * processing_modes(unit).len()
        }
        ProcessKind::Unknown { specific } => specific.len(),
        _ => 0,
    }
}

fn processing_type(unit: &ProcessingUnit) -> u16 {
    match unit.kind {
        ProcessKind::UpDownMix { .. } => v2::UP_DOWNMIX_PROCESS,
        ProcessKind::DolbyPrologic { .. } => v2::DOLBY_PROLOGIC_PROCESS,
        ProcessKind::StereoExtender => v2::STEREO_EXTENDER_PROCESS,
        _ => unit.process_type,
    }
}

/// Mixer bitmap bytes that fit in one descriptor.
fn mixer_controls(unit: &MixerUnit) -> &[u8] {
    let room = (255 - 13usize).saturating_sub(unit.sources.len());
    &unit.controls[..unit.controls.len().min(room)]
}

impl Uac2Descriptor for Entity {
    fn serialized_size(&self) -> usize {
        match &self.kind {
            EntityKind::InputTerminal(_) => v2::INPUT_TERMINAL_SIZE,
            EntityKind::OutputTerminal(_) => v2::OUTPUT_TERMINAL_SIZE,
            EntityKind::Mixer(unit) => 13 + unit.sources.len() + mixer_controls(unit).len(),
            EntityKind::Selector(unit) => 7 + unit.sources.len(),
            EntityKind::Feature(unit) => 6 + 4 * feature_entries(unit),
            EntityKind::Processing(unit) if unit.is_effect() => 8 + 4 * effect_entries(unit),
            EntityKind::Processing(unit) => {
                16 + unit.sources.len() + processing_specific_size(unit)
            }
            EntityKind::Extension(unit) => 15 + unit.sources.len(),
            EntityKind::ClockSource(_) => v2::CLOCK_SOURCE_SIZE,
            EntityKind::ClockSelector(selector) => 7 + selector.sources.len(),
            EntityKind::ClockMultiplier(_) => v2::CLOCK_MULTIPLIER_SIZE,
            EntityKind::MidiInJack(_) => 6,
            EntityKind::MidiOutJack(jack) => 7 + 2 * jack.sources.len(),
            EntityKind::MidiElement(element) => {
                10 + 2 * element.sources.len() + element.capabilities.len()
            }
        }
    }

    fn write_to(&self, w: &mut DescriptorWriter) {
        let length = self.serialized_size();
        match &self.kind {
            EntityKind::InputTerminal(it) => self.write_input_terminal(w, length, it),
            EntityKind::OutputTerminal(ot) => self.write_output_terminal(w, length, ot),
            EntityKind::Mixer(unit) => self.write_mixer(w, length, unit),
            EntityKind::Selector(unit) => self.write_selector(w, length, unit),
            EntityKind::Feature(unit) => self.write_feature(w, length, unit),
            EntityKind::Processing(unit) if unit.is_effect() => self.write_effect(w, length, unit),
            EntityKind::Processing(unit) => self.write_processing(w, length, unit),
            EntityKind::Extension(unit) => self.write_extension(w, length, unit),
            EntityKind::ClockSource(clock) => self.write_clock_source(w, length, clock),
            EntityKind::ClockSelector(selector) => self.write_clock_selector(w, length, selector),
            EntityKind::ClockMultiplier(multiplier) => {
                self.write_clock_multiplier(w, length, multiplier)
            }
            EntityKind::MidiInJack(jack) => {
                w.class_header(length, CS_INTERFACE, midi::MIDI_IN_JACK);
                w.u8(jack.jack_type);
                w.u8(self.id);
                w.u8(self.string_index);
            }
            EntityKind::MidiOutJack(jack) => self.write_midi_out_jack(w, length, jack),
            EntityKind::MidiElement(element) => self.write_midi_element(w, length, element),
        }
    }
}

impl Entity {
    fn write_input_terminal(&self, w: &mut DescriptorWriter, length: usize, it: &InputTerminal) {
        w.class_header(length, CS_INTERFACE, v2::INPUT_TERMINAL);
        w.u8(self.id);
        w.u16(it.terminal_type);
        w.u8(it.assoc_terminal);
        w.u8(it.clock_id.unwrap_or(0));
        w.cluster(&it.cluster);
        // bmControls: Audio 1.0 terminals have none.
        w.u16(0);
        w.u8(self.string_index);
    }

    fn write_output_terminal(&self, w: &mut DescriptorWriter, length: usize, ot: &OutputTerminal) {
        w.class_header(length, CS_INTERFACE, v2::OUTPUT_TERMINAL);
        w.u8(self.id);
        w.u16(ot.terminal_type);
        w.u8(ot.assoc_terminal);
        w.u8(ot.source_id);
        w.u8(ot.clock_id.unwrap_or(0));
        w.u16(0);
        w.u8(self.string_index);
    }

    fn write_mixer(&self, w: &mut DescriptorWriter, length: usize, unit: &MixerUnit) {
        w.class_header(length, CS_INTERFACE, v2::MIXER_UNIT);
        w.u8(self.id);
        w.u8(unit.sources.len() as u8);
        w.bytes(&unit.sources);
        w.cluster(&unit.cluster);
        w.bytes(mixer_controls(unit));
        w.u8(0);
        w.u8(self.string_index);
    }

    fn write_selector(&self, w: &mut DescriptorWriter, length: usize, unit: &SelectorUnit) {
        w.class_header(length, CS_INTERFACE, v2::SELECTOR_UNIT);
        w.u8(self.id);
        w.u8(unit.sources.len() as u8);
        w.bytes(&unit.sources);
        w.u8(v2::CONTROL_PROGRAMMABLE);
        w.u8(self.string_index);
    }

    fn write_feature(&self, w: &mut DescriptorWriter, length: usize, unit: &FeatureUnit) {
        w.class_header(length, CS_INTERFACE, v2::FEATURE_UNIT);
        w.u8(self.id);
        w.u8(unit.source_id);
        for channel in 0..feature_entries(unit) as u8 {
            w.u32(widen(v1::LOUDNESS_CONTROL, |index| {
                unit.find_control(channel, index)
            }));
        }
        w.u8(self.string_index);
    }

    fn write_effect(&self, w: &mut DescriptorWriter, length: usize, unit: &ProcessingUnit) {
        w.class_header(length, CS_INTERFACE, v2::EFFECT_UNIT);
        w.u8(self.id);
        w.u16(effect_type(&unit.kind));
        w.u8(unit.sources.first().copied().unwrap_or(0));
        // Audio 1.0 effects are controlled as a whole, so only the master entry has controls.
        w.u32(effect_controls(unit));
        for _ in 1..effect_entries(unit) {
            w.u32(0);
        }
        w.u8(self.string_index);
    }

    fn write_processing(&self, w: &mut DescriptorWriter, length: usize, unit: &ProcessingUnit) {
        w.class_header(length, CS_INTERFACE, v2::PROCESSING_UNIT);
        w.u8(self.id);
        w.u16(processing_type(unit));
        w.u8(unit.sources.len() as u8);
        w.bytes(&unit.sources);
        w.cluster(&unit.cluster);
        let controls = match unit.kind {
            ProcessKind::Unknown { .. } => widen(1, |i| unit.find_control(i)),
            _ => widen(2, |i| unit.find_control(i)),
        };
        w.u16(controls as u16);
        w.u8(self.string_index);
        match &unit.kind {
            ProcessKind::UpDownMix { .. } | ProcessKind::DolbyPrologic { .. } => {
                let modes = processing_modes(unit);
                w.u8(modes.len() as u8);
                for mode in modes {
                    w.u32(u32::from(*mode));
                }
            }
            ProcessKind::Unknown { specific } => w.bytes(specific),
            _ => (),
        }
    }

    fn write_extension(&self, w: &mut DescriptorWriter, length: usize, unit: &ExtensionUnit) {
        w.class_header(length, CS_INTERFACE, v2::EXTENSION_UNIT);
        w.u8(self.id);
        w.u16(unit.extension_code);
        w.u8(unit.sources.len() as u8);
        w.bytes(&unit.sources);
        w.cluster(&unit.cluster);
        w.u8(widen(1, |i| unit.find_control(i)) as u8);
        w.u8(self.string_index);
    }

    fn write_clock_source(&self, w: &mut DescriptorWriter, length: usize, clock: &ClockSource) {
        let programmable = clock.ranges.len() > 1
            || clock.ranges.iter().any(|range| range.min != range.max);
        let (attributes, frequency_control) = if programmable {
            (v2::CLOCK_TYPE_INTERNAL_PROGRAMMABLE, v2::CONTROL_PROGRAMMABLE)
        } else {
            (v2::CLOCK_TYPE_INTERNAL_FIXED, v2::CONTROL_READ_ONLY)
        };
        w.class_header(length, CS_INTERFACE, v2::CLOCK_SOURCE);
        w.u8(self.id);
        w.u8(attributes);
        w.u8(frequency_control | v2::CONTROL_READ_ONLY << 2);
        w.u8(clock.assoc_terminal);
        w.u8(self.string_index);
    }

    fn write_clock_selector(&self, w: &mut DescriptorWriter, length: usize, selector: &ClockSelector) {
        w.class_header(length, CS_INTERFACE, v2::CLOCK_SELECTOR);
        w.u8(self.id);
        w.u8(selector.sources.len() as u8);
        w.bytes(&selector.sources);
        w.u8(v2::CONTROL_PROGRAMMABLE);
        w.u8(self.string_index);
    }

    fn write_clock_multiplier(
        &self,
        w: &mut DescriptorWriter,
        length: usize,
        multiplier: &ClockMultiplier,
    ) {
        w.class_header(length, CS_INTERFACE, v2::CLOCK_MULTIPLIER);
        w.u8(self.id);
        w.u8(multiplier.source_id);
        w.u8(v2::CONTROL_PROGRAMMABLE | v2::CONTROL_PROGRAMMABLE << 2);
        w.u8(self.string_index);
    }

    fn write_midi_out_jack(&self, w: &mut DescriptorWriter, length: usize, jack: &MidiOutJack) {
        w.class_header(length, CS_INTERFACE, midi::MIDI_OUT_JACK);
        w.u8(jack.jack_type);
        w.u8(self.id);
        w.u8(jack.sources.len() as u8);
        for pin in &jack.sources {
            w.u8(pin.id);
            w.u8(pin.pin);
        }
        w.u8(self.string_index);
    }

    fn write_midi_element(&self, w: &mut DescriptorWriter, length: usize, element: &MidiElement) {
        w.class_header(length, CS_INTERFACE, midi::ELEMENT);
        w.u8(self.id);
        w.u8(element.sources.len() as u8);
        for pin in &element.sources {
            w.u8(pin.id);
            w.u8(pin.pin);
        }
        w.u8(element.output_pins);
        w.u8(element.in_terminal);
        w.u8(element.out_terminal);
        w.u8(element.capabilities.len() as u8);
        w.bytes(&element.capabilities);
        w.u8(self.string_index);
    }
}

impl Uac2Descriptor for FormatTypeDescriptor {
    fn serialized_size(&self) -> usize {
        match self.details {
            FormatDetails::Pcm { .. } => 6,
            FormatDetails::Compressed { .. } => 8,
        }
    }

    fn write_to(&self, w: &mut DescriptorWriter) {
        w.class_header(self.serialized_size(), CS_INTERFACE, uac::FORMAT_TYPE);
        w.u8(self.format_type);
        match self.details {
            FormatDetails::Pcm {
                subframe_size,
                bit_resolution,
                ..
            } => {
                w.u8(subframe_size);
                w.u8(bit_resolution);
            }
            FormatDetails::Compressed {
                max_bit_rate,
                samples_per_frame,
            } => {
                w.u16(max_bit_rate);
                w.u16(samples_per_frame);
            }
        }
    }
}

impl Uac2Descriptor for UsbEndpoint {
    fn serialized_size(&self) -> usize {
        let standard = match self.kind {
            // MIDI 1.0 keeps the Audio 1.0 endpoint layout.
            EndpointKind::MidiData => EndpointDescriptor::SIZE + 2,
            _ => EndpointDescriptor::SIZE,
        };
        let class = match (&self.class, self.kind) {
            (Some(ClassEndpoint::Midi { jacks }), _) => 4 + jacks.len(),
            (Some(_), EndpointKind::StreamingData) => v2::AS_ISO_ENDPOINT_SIZE,
            _ => 0,
        };
        standard + class
    }

    fn write_to(&self, w: &mut DescriptorWriter) {
        let attributes = match self.kind {
            EndpointKind::StreamingFeedback => (self.attributes & ENDP_ATTR_TY_MASK) | 0x10,
            _ => self.attributes,
        };
        if self.kind == EndpointKind::MidiData {
            w.u8(EndpointDescriptor::SIZE as u8 + 2);
        } else {
            w.u8(EndpointDescriptor::SIZE as u8);
        }
        w.u8(DescriptorKind::Endpoint as u8);
        w.u8(self.address);
        w.u8(attributes);
        w.u16(self.max_packet_size);
        w.u8(self.interval);
        if self.kind == EndpointKind::MidiData {
            w.u8(self.refresh);
            w.u8(self.synch_address);
        }

        match (&self.class, self.kind) {
            (Some(ClassEndpoint::Midi { jacks }), _) => {
                w.class_header(4 + jacks.len(), CS_ENDPOINT, midi::MS_GENERAL);
                w.u8(jacks.len() as u8);
                w.bytes(jacks);
            }
            (Some(class), EndpointKind::StreamingData) => {
                let (lock_delay_units, lock_delay) = match class {
                    ClassEndpoint::Audio {
                        lock_delay_units,
                        lock_delay,
                        ..
                    } => (*lock_delay_units, *lock_delay),
                    ClassEndpoint::Midi { .. } => (0, 0),
                };
                let controls = class.controls();
                w.class_header(v2::AS_ISO_ENDPOINT_SIZE, CS_ENDPOINT, uac::EP_GENERAL);
                w.u8((controls & AsEndpointControls::MAX_PACKETS_ONLY).bits());
                if controls.contains(AsEndpointControls::PITCH) {
                    w.u8(v2::CONTROL_PROGRAMMABLE);
                } else {
                    w.u8(0);
                }
                w.u8(lock_delay_units);
                w.u16(lock_delay);
            }
            _ => (),
        }
    }
}

/// A wTotalLength field counting `size` bytes.
fn total_length(size: usize) -> Result<u16, WriteError> {
    u16::try_from(size).map_err(|_| WriteError::TotalLengthOverflow { size })
}

fn endpoints_size(alt: &AlternateSetting) -> usize {
    alt.endpoints.iter().map(Uac2Descriptor::serialized_size).sum()
}

fn entities_size(entities: &EntityList) -> usize {
    entities.iter().map(Uac2Descriptor::serialized_size).sum()
}

fn control_body_size(control: &ControlSetting) -> usize {
    v2::HEADER_SIZE + entities_size(&control.entities)
}

fn midi_body_size(midi: &MidiSetting) -> usize {
    7 + entities_size(&midi.entities)
}

fn streaming_body_size(streaming: &StreamingSetting) -> usize {
    match streaming.general {
        Some(_) => {
            v2::AS_GENERAL_SIZE
                + streaming
                    .format
                    .as_ref()
                    .map_or(0, Uac2Descriptor::serialized_size)
        }
        None => 0,
    }
}

impl Uac2Descriptor for AlternateSetting {
    fn serialized_size(&self) -> usize {
        let body = match &self.kind {
            SettingKind::AudioControl(control) => control_body_size(control),
            SettingKind::AudioStreaming(streaming) => streaming_body_size(streaming),
            SettingKind::MidiStreaming(midi) => midi_body_size(midi),
            SettingKind::Other { raw } => return raw.len(),
        };
        InterfaceDescriptor::SIZE + body + endpoints_size(self)
    }

    fn check_lengths(&self) -> Result<(), WriteError> {
        let body = match &self.kind {
            SettingKind::AudioControl(control) => control_body_size(control),
            SettingKind::MidiStreaming(midi) => midi_body_size(midi),
            _ => return Ok(()),
        };
        total_length(body).map(drop)
    }

    fn write_to(&self, w: &mut DescriptorWriter) {
        if let SettingKind::Other { raw } = &self.kind {
            w.bytes(raw);
            return;
        }

        let protocol = if self.is_audio() {
            uac::IP_VERSION_02_00
        } else {
            self.protocol
        };
        w.u8(InterfaceDescriptor::SIZE as u8);
        w.u8(DescriptorKind::Interface as u8);
        w.u8(self.interface_number);
        w.u8(self.alternate_setting);
        w.u8(self.endpoints.len() as u8);
        w.u8(self.class);
        w.u8(self.sub_class);
        w.u8(protocol);
        w.u8(self.interface_str);

        match &self.kind {
            SettingKind::AudioControl(control) => {
                w.class_header(v2::HEADER_SIZE, CS_INTERFACE, v2::HEADER);
                w.u16(v2::ADC_RELEASE);
                w.u8(control.category);
                w.u16(total_length(control_body_size(control)).unwrap_or(u16::MAX));
                w.u8(0);
                for entity in &control.entities {
                    entity.write_to(w);
                }
            }
            SettingKind::AudioStreaming(streaming) => {
                if let Some(general) = &streaming.general {
                    let format_type = streaming
                        .format
                        .as_ref()
                        .map_or(uac::FORMAT_TYPE_I, |format| format.format_type);
                    w.class_header(v2::AS_GENERAL_SIZE, CS_INTERFACE, uac::AS_GENERAL);
                    w.u8(general.terminal_link);
                    // Active and valid alternate settings, both read-only.
                    w.u8(v2::CONTROL_READ_ONLY | v2::CONTROL_READ_ONLY << 2);
                    w.u8(format_type);
                    w.u32(general.formats_bitmap());
                    w.cluster(&streaming.cluster);
                    if let Some(format) = &streaming.format {
                        format.write_to(w);
                    }
                }
            }
            SettingKind::MidiStreaming(midi) => {
                w.class_header(7, CS_INTERFACE, midi::MS_HEADER);
                w.u16(midi.msc);
                w.u16(total_length(midi_body_size(midi)).unwrap_or(u16::MAX));
                for entity in &midi.entities {
                    entity.write_to(w);
                }
            }
            SettingKind::Other { .. } => (),
        }

        for endpoint in &self.endpoints {
            endpoint.write_to(w);
        }
    }
}

impl Uac2Descriptor for UsbInterface {
    fn serialized_size(&self) -> usize {
        self.alternates
            .iter()
            .map(Uac2Descriptor::serialized_size)
            .sum()
    }

    fn check_lengths(&self) -> Result<(), WriteError> {
        self.alternates.iter().try_for_each(Uac2Descriptor::check_lengths)
    }

    fn write_to(&self, w: &mut DescriptorWriter) {
        for alt in &self.alternates {
            alt.write_to(w);
        }
    }
}

impl UsbConfiguration {
    /// The Interface Association Descriptor to emit in front of interface `number`, if it starts
    /// an audio function.
    fn association_before(&self, number: u8) -> Option<InterfaceAssociationDescriptor> {
        if !self.interface_association {
            return None;
        }
        self.interfaces
            .iter()
            .filter(|iface| iface.is_control())
            .find_map(|iface| {
                let alt = iface.alternates.first()?;
                let control = match &alt.kind {
                    SettingKind::AudioControl(control) => control,
                    _ => return None,
                };
                let first = control
                    .streaming_interfaces
                    .iter()
                    .copied()
                    .fold(iface.number, u8::min);
                (first == number).then(|| InterfaceAssociationDescriptor {
                    length: InterfaceAssociationDescriptor::SIZE as u8,
                    kind: DescriptorKind::InterfaceAssociation as u8,
                    first_interface: first,
                    interface_count: 1 + control.streaming_interfaces.len() as u8,
                    function_class: uac::CLASS_AUDIO,
                    function_sub_class: 0,
                    function_protocol: uac::IP_VERSION_02_00,
                    function_str: alt.interface_str,
                })
            })
    }
}

impl Uac2Descriptor for UsbConfiguration {
    fn serialized_size(&self) -> usize {
        let associations = self
            .interfaces
            .iter()
            .filter(|iface| self.association_before(iface.number).is_some())
            .count()
            * InterfaceAssociationDescriptor::SIZE;
        ConfigDescriptor::SIZE
            + associations
            + self
                .interfaces
                .iter()
                .map(Uac2Descriptor::serialized_size)
                .sum::<usize>()
    }

    fn check_lengths(&self) -> Result<(), WriteError> {
        total_length(self.serialized_size())?;
        self.interfaces.iter().try_for_each(Uac2Descriptor::check_lengths)
    }

    fn write_to(&self, w: &mut DescriptorWriter) {
        w.u8(ConfigDescriptor::SIZE as u8);
        w.u8(DescriptorKind::Configuration as u8);
        // Bounded by check_lengths.
        w.u16(total_length(self.serialized_size()).unwrap_or(u16::MAX));
        w.u8(self.interfaces.len() as u8);
        w.u8(self.configuration_value);
        w.u8(self.configuration_str);
        w.u8(self.attributes);
        w.u8(self.max_power);

        for iface in &self.interfaces {
            if let Some(iad) = self.association_before(iface.number) {
                w.u8(iad.length);
                w.u8(iad.kind);
                w.u8(iad.first_interface);
                w.u8(iad.interface_count);
                w.u8(iad.function_class);
                w.u8(iad.function_sub_class);
                w.u8(iad.function_protocol);
                w.u8(iad.function_str);
            }
            iface.write_to(w);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::{FeatureUnit, ProcessingUnit};
    use crate::model::SampleRates;
    use smallvec::smallvec;

    fn entity(id: u8, kind: EntityKind) -> Entity {
        Entity {
            id,
            descriptor_subtype: 0,
            interface_number: 0,
            string_index: 7,
            kind,
        }
    }

    fn processing(kind: ProcessKind, controls: u8, channels: u8) -> Entity {
        entity(
            4,
            EntityKind::Processing(ProcessingUnit {
                process_type: 0,
                sources: smallvec![2],
                cluster: ChannelCluster {
                    channels,
                    config: 0x3,
                    names_str: 0,
                },
                controls: smallvec![controls],
                kind,
            }),
        )
    }

    fn assert_self_describing(entity: &Entity) -> Vec<u8> {
        let bytes = entity.to_bytes().unwrap();
        assert_eq!(bytes.len(), entity.serialized_size());
        assert_eq!(usize::from(bytes[0]), bytes.len());
        assert_eq!(bytes[1], CS_INTERFACE);
        bytes
    }

    #[test]
    fn overflow_is_sticky() {
        let mut buffer = [0u8; 3];
        let mut writer = DescriptorWriter::new(&mut buffer);
        writer.u16(0x0201);
        writer.u16(0x0403);
        writer.u8(5);
        assert_eq!(writer.position(), 5);
        assert_eq!(
            writer.finish(),
            Err(WriteError::BufferTooSmall {
                needed: 5,
                available: 3
            })
        );
        assert_eq!(buffer, [1, 2, 0]);
    }

    #[test]
    fn feature_controls_are_widened() {
        let feature = entity(
            2,
            EntityKind::Feature(FeatureUnit {
                source_id: 1,
                controls: smallvec![0x0003, 0x0002, 0x0200],
            }),
        );
        let bytes = assert_self_describing(&feature);
        assert_eq!(bytes.len(), 6 + 3 * 4);
        assert_eq!(&bytes[2..5], &[v2::FEATURE_UNIT, 2, 1]);
        assert_eq!(&bytes[5..9], &0x0000_000Fu32.to_le_bytes());
        assert_eq!(&bytes[9..13], &0x0000_000Cu32.to_le_bytes());
        assert_eq!(&bytes[13..17], &0x000C_0000u32.to_le_bytes());
        assert_eq!(bytes[17], 7);
    }

    #[test]
    fn reverberation_becomes_effect_unit() {
        // Enable, type and level.
        let reverb = processing(ProcessKind::Reverberation, 0b0000_0111, 2);
        let bytes = assert_self_describing(&reverb);
        assert_eq!(bytes.len(), 8 + 3 * 4);
        assert_eq!(bytes[2], v2::EFFECT_UNIT);
        assert_eq!(&bytes[4..6], &v2::REVERBERATION_EFFECT.to_le_bytes());
        assert_eq!(bytes[6], 2);
        assert_eq!(&bytes[7..11], &0x0000_0033u32.to_le_bytes());
        assert!(bytes[11..19].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn up_down_mix_modes_are_widened() {
        let modes = ProcessKind::UpDownMix {
            modes: smallvec![0x0003, 0x0033],
        };
        let bytes = assert_self_describing(&processing(modes, 0b11, 2));
        assert_eq!(bytes.len(), 16 + 1 + 1 + 2 * 4);
        assert_eq!(&bytes[4..6], &v2::UP_DOWNMIX_PROCESS.to_le_bytes());
        // bmControls, then iProcessing.
        assert_eq!(&bytes[14..16], &[0x0F, 0]);
        assert_eq!(bytes[16], 7);
        assert_eq!(bytes[17], 2);
        assert_eq!(&bytes[18..22], &3u32.to_le_bytes());
        assert_eq!(&bytes[22..26], &0x33u32.to_le_bytes());
    }

    #[test]
    fn chorus_and_compressor_become_effect_units() {
        // Enable, level and depth; rate is fixed.
        let chorus = processing(ProcessKind::Chorus, 0b0000_1011, 1);
        assert_eq!(
            assert_self_describing(&chorus),
            vec![16, 0x24, v2::EFFECT_UNIT, 4, 0x03, 0x00, 2, 0xCF, 0, 0, 0, 0, 0, 0, 0, 7]
        );

        // Enable and release time.
        let compressor = processing(ProcessKind::DynamicRangeCompression, 0b0010_0001, 0);
        assert_eq!(
            assert_self_describing(&compressor),
            vec![12, 0x24, v2::EFFECT_UNIT, 4, 0x04, 0x00, 2, 0x03, 0x0C, 0, 0, 7]
        );
    }

    #[test]
    fn dolby_prologic_modes_are_widened() {
        let modes = ProcessKind::DolbyPrologic {
            modes: smallvec![0x0007, 0x0107],
        };
        let bytes = assert_self_describing(&processing(modes, 0b01, 2));
        assert_eq!(bytes.len(), 26);
        assert_eq!(&bytes[2..6], &[v2::PROCESSING_UNIT, 4, 0x02, 0x00]);
        assert_eq!(&bytes[14..16], &[0x03, 0]);
        assert_eq!(bytes[17], 2);
        assert_eq!(&bytes[18..22], &[0x07, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[22..26], &[0x07, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn mixer_channel_config_is_zero_extended() {
        let mixer = entity(
            5,
            EntityKind::Mixer(MixerUnit {
                sources: smallvec![1, 2],
                cluster: ChannelCluster {
                    channels: 2,
                    config: 0x0003,
                    names_str: 0,
                },
                controls: smallvec![0b1111_0000],
            }),
        );
        assert_eq!(
            assert_self_describing(&mixer),
            vec![16, 0x24, v2::MIXER_UNIT, 5, 2, 1, 2, 2, 0x03, 0, 0, 0, 0, 0xF0, 0, 7]
        );
    }

    #[test]
    fn selectors_and_multiplier() {
        let selector = entity(
            6,
            EntityKind::Selector(SelectorUnit {
                sources: smallvec![1, 2],
            }),
        );
        assert_eq!(
            assert_self_describing(&selector),
            vec![9, 0x24, v2::SELECTOR_UNIT, 6, 2, 1, 2, v2::CONTROL_PROGRAMMABLE, 7]
        );

        let clock_selector = entity(
            9,
            EntityKind::ClockSelector(ClockSelector {
                sources: smallvec![4, 5],
                position: 1,
            }),
        );
        assert_eq!(
            assert_self_describing(&clock_selector),
            vec![9, 0x24, v2::CLOCK_SELECTOR, 9, 2, 4, 5, v2::CONTROL_PROGRAMMABLE, 7]
        );

        let multiplier = entity(
            10,
            EntityKind::ClockMultiplier(ClockMultiplier {
                source_id: 4,
                numerator: 2,
                denominator: 1,
            }),
        );
        assert_eq!(
            assert_self_describing(&multiplier),
            vec![7, 0x24, v2::CLOCK_MULTIPLIER, 10, 4, 0b1111, 7]
        );
    }

    #[test]
    fn format_type_records() {
        let compressed = FormatTypeDescriptor {
            length: 9,
            descriptor_type: 0x24,
            descriptor_subtype: uac::FORMAT_TYPE,
            format_type: uac::FORMAT_TYPE_II,
            details: FormatDetails::Compressed {
                max_bit_rate: 384,
                samples_per_frame: 1152,
            },
            rates: SampleRates::Discrete(smallvec![48_000]),
        };
        assert_eq!(
            compressed.to_bytes().unwrap(),
            vec![8, 0x24, uac::FORMAT_TYPE, 2, 0x80, 0x01, 0x80, 0x04]
        );

        let iec61937 = FormatTypeDescriptor {
            length: 11,
            descriptor_type: 0x24,
            descriptor_subtype: uac::FORMAT_TYPE,
            format_type: uac::FORMAT_TYPE_III,
            details: FormatDetails::Pcm {
                channels: 2,
                subframe_size: 2,
                bit_resolution: 16,
            },
            rates: SampleRates::Discrete(smallvec![48_000]),
        };
        assert_eq!(
            iec61937.to_bytes().unwrap(),
            vec![6, 0x24, uac::FORMAT_TYPE, 3, 2, 16]
        );
    }

    #[test]
    fn total_length_must_fit() {
        let vendor = AlternateSetting {
            interface_number: 0,
            alternate_setting: 0,
            class: 0xFF,
            sub_class: 0,
            protocol: 0,
            interface_str: 0,
            endpoints: Default::default(),
            kind: SettingKind::Other {
                raw: vec![0; 70_000],
            },
        };
        let configuration = UsbConfiguration {
            configuration_value: 1,
            configuration_str: 0,
            attributes: 0x80,
            max_power: 50,
            interface_association: false,
            interfaces: vec![UsbInterface::new(vendor)],
            raw: Vec::new(),
        };
        assert_eq!(
            configuration.to_bytes(),
            Err(WriteError::TotalLengthOverflow { size: 70_009 })
        );
    }

    #[test]
    fn clock_source_attributes_follow_ranges() {
        let mut clock = ClockSource {
            ranges: vec![crate::entity::FrequencyRange {
                min: 48_000,
                max: 48_000,
                resolution: 0,
            }],
            current_frequency: 48_000,
            assoc_terminal: 1,
        };
        let fixed = entity(9, EntityKind::ClockSource(clock.clone()));
        assert_eq!(
            assert_self_describing(&fixed),
            vec![8, 0x24, v2::CLOCK_SOURCE, 9, 0b01, 0b0101, 1, 7]
        );

        clock.ranges.push(crate::entity::FrequencyRange {
            min: 44_100,
            max: 44_100,
            resolution: 0,
        });
        let programmable = entity(9, EntityKind::ClockSource(clock));
        let bytes = assert_self_describing(&programmable);
        assert_eq!(&bytes[4..6], &[0b11, 0b0111]);
    }

    #[test]
    fn short_buffer_is_rejected_before_writing() {
        let feature = entity(
            2,
            EntityKind::Feature(FeatureUnit {
                source_id: 1,
                controls: smallvec![0x1],
            }),
        );
        let mut buffer = [0xAAu8; 9];
        assert_eq!(
            feature.serialize_into(&mut buffer),
            Err(WriteError::BufferTooSmall {
                needed: 10,
                available: 9
            })
        );
        assert!(buffer.iter().all(|byte| *byte == 0xAA));
    }
}
