//! The audio topology entities.
//!
//! Every node of an Audio Control (or MIDI Streaming) interface is an [Entity]: a small header
//! shared by all kinds, plus an [EntityKind] payload. Entities refer to each other by id only, so
//! the graph owns no references into the raw configuration buffer and no entity owns another.

use serde::Serialize;
use smallvec::SmallVec;

use crate::error::ParseError;

/// Ordered source ids. The position of an id is its input pin number.
pub type SourceIds = SmallVec<[u8; 4]>;

/// The logical channels leaving an entity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ChannelCluster {
    /// bNrChannels
    pub channels: u8,
    /// Spatial locations of the channels. Audio 1.0 stores 16 bits, Audio 2.0 stores 32.
    pub config: u32,
    /// iChannelNames
    pub names_str: u8,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Entity {
    /// bTerminalID / bUnitID / bClockID / bJackID / bElementID.
    pub id: u8,
    /// The bDescriptorSubtype the entity was read with. Synthesized entities carry their Audio
    /// 2.0 subtype.
    pub descriptor_subtype: u8,
    /// The interface the entity belongs to.
    pub interface_number: u8,
    /// iTerminal / iMixer / iSelector / ... string index.
    pub string_index: u8,
    pub kind: EntityKind,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum EntityKind {
    InputTerminal(InputTerminal),
    OutputTerminal(OutputTerminal),
    Mixer(MixerUnit),
    Selector(SelectorUnit),
    Feature(FeatureUnit),
    Processing(ProcessingUnit),
    Extension(ExtensionUnit),
    ClockSource(ClockSource),
    ClockSelector(ClockSelector),
    ClockMultiplier(ClockMultiplier),
    MidiInJack(MidiInJack),
    MidiOutJack(MidiOutJack),
    MidiElement(MidiElement),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InputTerminal {
    pub terminal_type: u16,
    pub assoc_terminal: u8,
    pub cluster: ChannelCluster,
    /// Id of the clock entity driving this terminal. Assigned by the topology builder.
    pub clock_id: Option<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OutputTerminal {
    pub terminal_type: u16,
    pub assoc_terminal: u8,
    pub source_id: u8,
    pub clock_id: Option<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MixerUnit {
    pub sources: SourceIds,
    pub cluster: ChannelCluster,
    /// bmControls: one bit per (input channel, output channel) crosspoint, most significant bit
    /// of the first byte first. A set bit marks a programmable crosspoint.
    pub controls: SmallVec<[u8; 8]>,
}

impl MixerUnit {
    fn crosspoint(&self, control_number: u8) -> Option<(u8, u8)> {
        let outputs = self.cluster.channels;
        if outputs == 0 {
            return None;
        }
        Some((control_number / outputs, control_number % outputs))
    }

    /// The Audio 1.0 wValue addressing crosspoint `control_number`:
    /// `((input + 1) << 8) | (output + 1)`, where the Audio 2.0 mixer control number is
    /// `input * outputs + output`.
    pub fn legacy_value(&self, control_number: u8) -> Option<u16> {
        let (input, output) = self.crosspoint(control_number)?;
        Some((u16::from(input) + 1) << 8 | (u16::from(output) + 1))
    }

    /// Inverse of [MixerUnit::legacy_value].
    #[cfg(test)]
    pub fn control_number(&self, legacy_value: u16) -> Option<u8> {
        let input = (legacy_value >> 8) as u8;
        let output = legacy_value as u8;
        if input == 0 || output == 0 || output > self.cluster.channels {
            return None;
        }
        let number = u16::from(input - 1) * u16::from(self.cluster.channels) + u16::from(output - 1);
        u8::try_from(number).ok()
    }

    /// Whether the bitmap marks the crosspoint as programmable.
    pub fn is_programmable(&self, control_number: u8) -> bool {
        let index = usize::from(control_number);
        self.controls
            .get(index / 8)
            .map(|byte| byte & (0x80 >> (index % 8)) != 0)
            .unwrap_or(false)
    }

    /// Number of crosspoints the bitmap can describe.
    pub fn crosspoints(&self) -> usize {
        self.controls.len() * 8
    }

    /// Number of mixer controls for `input_channels` logical input channels. Bitmap bits past
    /// this count are padding.
    pub fn controls_in_use(&self, input_channels: usize) -> usize {
        input_channels * usize::from(self.cluster.channels)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SelectorUnit {
    pub sources: SourceIds,
}

bitflags::bitflags! {
    /// Audio 1.0 Feature Unit bmaControls bits (UAC1 Table 4-7).
    #[derive(Default)]
    pub struct FeatureControls: u32 {
        const MUTE = 1 << 0;
        const VOLUME = 1 << 1;
        const BASS = 1 << 2;
        const MID = 1 << 3;
        const TREBLE = 1 << 4;
        const GRAPHIC_EQUALIZER = 1 << 5;
        const AUTOMATIC_GAIN = 1 << 6;
        const DELAY = 1 << 7;
        const BASS_BOOST = 1 << 8;
        const LOUDNESS = 1 << 9;
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FeatureUnit {
    pub source_id: u8,
    /// bmaControls, one entry per channel. Entry 0 is the master channel.
    pub controls: SmallVec<[u32; 8]>,
}

impl FeatureUnit {
    /// Number of logical channels, not counting the master channel.
    pub fn channels(&self) -> u8 {
        self.controls.len().saturating_sub(1) as u8
    }

    pub fn channel_controls(&self, channel: u8) -> FeatureControls {
        self.controls
            .get(usize::from(channel))
            .map(|bits| FeatureControls::from_bits_truncate(*bits))
            .unwrap_or_default()
    }

    /// Whether control bit `index` (zero based, the selector minus one) is set for `channel`.
    pub fn find_control(&self, channel: u8, index: u8) -> bool {
        index < 32
            && self
                .controls
                .get(usize::from(channel))
                .map(|bits| bits & (1 << index) != 0)
                .unwrap_or(false)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ProcessKind {
    UpDownMix { modes: SmallVec<[u16; 4]> },
    DolbyPrologic { modes: SmallVec<[u16; 4]> },
    StereoExtender,
    Reverberation,
    Chorus,
    DynamicRangeCompression,
    /// A process type this translation has no Audio 2.0 counterpart for.
    Unknown { specific: Vec<u8> },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProcessingUnit {
    /// wProcessType as read from the Audio 1.0 descriptor.
    pub process_type: u16,
    pub sources: SourceIds,
    pub cluster: ChannelCluster,
    /// bmControls, one bit per control. Bit 0 is Enable for every process type.
    pub controls: SmallVec<[u8; 2]>,
    pub kind: ProcessKind,
}

impl ProcessingUnit {
    /// Whether control bit `index` is set in bmControls.
    pub fn find_control(&self, index: u8) -> bool {
        find_bit(&self.controls, index)
    }

    /// Reverberation, chorus and dynamic range compression became Effect Units in Audio 2.0.
    pub fn is_effect(&self) -> bool {
        matches!(
            self.kind,
            ProcessKind::Reverberation | ProcessKind::Chorus | ProcessKind::DynamicRangeCompression
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ExtensionUnit {
    pub extension_code: u16,
    pub sources: SourceIds,
    pub cluster: ChannelCluster,
    pub controls: SmallVec<[u8; 2]>,
}

impl ExtensionUnit {
    pub fn find_control(&self, index: u8) -> bool {
        find_bit(&self.controls, index)
    }
}

/// Bit `index` of a little-endian bitmap.
pub(crate) fn find_bit(bitmap: &[u8], index: u8) -> bool {
    let index = usize::from(index);
    bitmap
        .get(index / 8)
        .map(|byte| byte & (1 << (index % 8)) != 0)
        .unwrap_or(false)
}

/// One sampling-frequency sub-range, in Hz.
///
/// A discrete rate is stored as `min == max` with a zero resolution.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct FrequencyRange {
    pub min: u32,
    pub max: u32,
    pub resolution: u32,
}

impl FrequencyRange {
    pub fn contains(&self, frequency: u32) -> bool {
        self.min <= frequency && frequency <= self.max
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ClockSource {
    /// Registered ranges, deduplicated, in insertion order.
    pub ranges: Vec<FrequencyRange>,
    pub current_frequency: u32,
    pub assoc_terminal: u8,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClockSelector {
    pub sources: SourceIds,
    /// Selected input pin, one based.
    pub position: u8,
}

impl ClockSelector {
    /// Appends a candidate clock unless it is already listed.
    pub fn add_source(&mut self, clock_id: u8) {
        if !self.sources.contains(&clock_id) {
            self.sources.push(clock_id);
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClockMultiplier {
    pub source_id: u8,
    pub numerator: u16,
    pub denominator: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MidiPin {
    pub id: u8,
    pub pin: u8,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MidiInJack {
    /// Embedded (1) or external (2).
    pub jack_type: u8,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MidiOutJack {
    pub jack_type: u8,
    pub sources: SmallVec<[MidiPin; 2]>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MidiElement {
    pub sources: SmallVec<[MidiPin; 2]>,
    pub output_pins: u8,
    pub in_terminal: u8,
    pub out_terminal: u8,
    pub capabilities: SmallVec<[u8; 2]>,
}

impl Entity {
    /// Ids of the entities feeding this one, in pin order.
    pub fn source_ids(&self) -> SourceIds {
        match &self.kind {
            EntityKind::InputTerminal(_) => SourceIds::new(),
            EntityKind::OutputTerminal(ot) => smallvec::smallvec![ot.source_id],
            EntityKind::Mixer(unit) => unit.sources.clone(),
            EntityKind::Selector(unit) => unit.sources.clone(),
            EntityKind::Feature(unit) => smallvec::smallvec![unit.source_id],
            EntityKind::Processing(unit) => unit.sources.clone(),
            EntityKind::Extension(unit) => unit.sources.clone(),
            EntityKind::ClockSource(_) => SourceIds::new(),
            EntityKind::ClockSelector(sel) => sel.sources.clone(),
            EntityKind::ClockMultiplier(mul) => smallvec::smallvec![mul.source_id],
            EntityKind::MidiInJack(_) => SourceIds::new(),
            EntityKind::MidiOutJack(jack) => jack.sources.iter().map(|pin| pin.id).collect(),
            EntityKind::MidiElement(element) => element.sources.iter().map(|pin| pin.id).collect(),
        }
    }

    /// Every id this entity refers to: its sources plus its clock.
    pub fn referenced_ids(&self) -> SourceIds {
        let mut ids = self.source_ids();
        if let Some(clock) = self.clock_id() {
            ids.push(clock);
        }
        ids
    }

    /// The cluster this entity itself declares, if its descriptor carries one.
    pub fn cluster(&self) -> Option<ChannelCluster> {
        match &self.kind {
            EntityKind::InputTerminal(it) => Some(it.cluster),
            EntityKind::Mixer(unit) => Some(unit.cluster),
            EntityKind::Processing(unit) => Some(unit.cluster),
            EntityKind::Extension(unit) => Some(unit.cluster),
            _ => None,
        }
    }

    pub fn clock_id(&self) -> Option<u8> {
        match &self.kind {
            EntityKind::InputTerminal(it) => it.clock_id,
            EntityKind::OutputTerminal(ot) => ot.clock_id,
            _ => None,
        }
    }

    pub(crate) fn set_clock_id(&mut self, clock: u8) {
        match &mut self.kind {
            EntityKind::InputTerminal(it) => it.clock_id = Some(clock),
            EntityKind::OutputTerminal(ot) => ot.clock_id = Some(clock),
            _ => (),
        }
    }
}

/// The entities of one alternate setting, in descriptor order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityList(Vec<Entity>);

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity, rejecting an id that is already taken.
    pub fn push(&mut self, entity: Entity) -> Result<(), ParseError> {
        if self.get(entity.id).is_some() {
            return Err(ParseError::DuplicateEntity { id: entity.id });
        }
        self.0.push(entity);
        Ok(())
    }

    pub fn get(&self, id: u8) -> Option<&Entity> {
        self.0.iter().find(|entity| entity.id == id)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut Entity> {
        self.0.iter_mut().find(|entity| entity.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_id(&self) -> Option<u8> {
        self.0.iter().map(|entity| entity.id).max()
    }

    /// Checks that every referenced id resolves to an entity of this list.
    pub fn validate_references(&self) -> Result<(), ParseError> {
        for entity in &self.0 {
            for id in entity.referenced_ids() {
                if self.get(id).is_none() {
                    return Err(ParseError::DanglingReference {
                        entity: entity.id,
                        missing: id,
                    });
                }
            }
        }
        Ok(())
    }

    /// The cluster leaving entity `id`, following the first source pin upstream through units
    /// that pass their input cluster through (feature units, selectors, output terminals).
    pub fn channel_cluster(&self, id: u8) -> Option<ChannelCluster> {
        let mut current = self.get(id)?;
        // A well-formed topology is acyclic; the bound keeps a malformed one from looping.
        for _ in 0..=self.0.len() {
            if let Some(cluster) = current.cluster() {
                return Some(cluster);
            }
            let next = *current.source_ids().first()?;
            current = self.get(next)?;
        }
        None
    }

    /// Logical channels entering entity `id`, summed over its source pins.
    pub fn input_channels(&self, id: u8) -> usize {
        self.get(id)
            .map(|entity| {
                entity
                    .source_ids()
                    .iter()
                    .filter_map(|source| self.channel_cluster(*source))
                    .map(|cluster| usize::from(cluster.channels))
                    .sum()
            })
            .unwrap_or(0)
    }

    pub fn clock_source(&self, id: u8) -> Option<&ClockSource> {
        match &self.get(id)?.kind {
            EntityKind::ClockSource(clock) => Some(clock),
            _ => None,
        }
    }

    pub fn clock_source_mut(&mut self, id: u8) -> Option<&mut ClockSource> {
        match &mut self.get_mut(id)?.kind {
            EntityKind::ClockSource(clock) => Some(clock),
            _ => None,
        }
    }

    /// Number of Clock Source entities.
    pub fn clock_source_count(&self) -> usize {
        self.0
            .iter()
            .filter(|entity| matches!(entity.kind, EntityKind::ClockSource(_)))
            .count()
    }
}

impl<'a> IntoIterator for &'a EntityList {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
