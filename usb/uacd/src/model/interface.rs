use serde::Serialize;
use smallvec::SmallVec;

use super::endpoint::{ClassEndpoint, UsbEndpoint};
use super::format::{AsGeneral, FormatTypeDescriptor};
use crate::entity::{ChannelCluster, EntityList};
use crate::error::ParseError;
use crate::reader::{self, Descriptor};
use crate::uac::{self, midi, v1};
use crate::usb::{DescriptorKind, InterfaceDescriptor};

/// The Audio Control part of an alternate setting.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ControlSetting {
    /// bcdADC of the source header.
    pub adc: u16,
    /// The streaming interfaces of this audio function, from the header's baInterfaceNr.
    pub streaming_interfaces: SmallVec<[u8; 4]>,
    /// bCategory written into the synthesized Audio 2.0 header.
    pub category: u8,
    pub entities: EntityList,
}

/// The Audio Streaming part of an alternate setting.
///
/// Alternate setting 0 of a streaming interface carries no format; it is the zero-bandwidth
/// setting.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StreamingSetting {
    pub general: Option<AsGeneral>,
    pub format: Option<FormatTypeDescriptor>,
    /// The Audio Control interface whose header lists this interface.
    pub control_interface: Option<u8>,
    /// The clock driving the linked terminal.
    pub clock_id: Option<u8>,
    /// The cluster the stream carries, resolved from the linked terminal.
    pub cluster: ChannelCluster,
}

impl StreamingSetting {
    pub fn format_tag(&self) -> Option<u16> {
        self.general.map(|general| general.format_tag)
    }
}

/// The MIDI Streaming part of an alternate setting.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MidiSetting {
    /// bcdMSC
    pub msc: u16,
    pub entities: EntityList,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum SettingKind {
    AudioControl(ControlSetting),
    AudioStreaming(StreamingSetting),
    MidiStreaming(MidiSetting),
    /// Any other interface, kept as the bytes it was read from.
    Other { raw: Vec<u8> },
}

/// One (interface, bAlternateSetting) pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AlternateSetting {
    pub interface_number: u8,
    pub alternate_setting: u8,
    pub class: u8,
    pub sub_class: u8,
    pub protocol: u8,
    pub interface_str: u8,
    pub endpoints: SmallVec<[UsbEndpoint; 2]>,
    pub kind: SettingKind,
}

impl AlternateSetting {
    /// Builds an alternate setting from its descriptors: the standard interface descriptor first,
    /// followed by everything up to the next interface descriptor.
    pub fn parse(descriptors: &[Descriptor], category: u8) -> Result<Self, ParseError> {
        let first = descriptors.first().ok_or(ParseError::UnknownRequiredField {
            offset: 0,
            field: "interface descriptor",
        })?;
        let iface = first.read::<InterfaceDescriptor>()?;
        let sub_class = if iface.class == uac::CLASS_AUDIO {
            iface.sub_class
        } else {
            0
        };

        let mut endpoints = SmallVec::<[UsbEndpoint; 2]>::new();
        for desc in &descriptors[1..] {
            if desc.is(DescriptorKind::Endpoint) {
                endpoints.push(UsbEndpoint::parse(desc)?);
            } else if desc.is(DescriptorKind::ClassEndpoint) {
                let endpoint = match endpoints.last_mut() {
                    Some(endpoint) => endpoint,
                    None => {
                        log::warn!(
                            "class-specific endpoint at offset {} has no endpoint",
                            desc.offset
                        );
                        continue;
                    }
                };
                endpoint.class = Some(match sub_class {
                    uac::SUBCLASS_MIDI_STREAMING => ClassEndpoint::parse_midi(desc)?,
                    _ => ClassEndpoint::parse_audio(desc)?,
                });
            }
        }
        let synch_addresses: SmallVec<[u8; 2]> = endpoints
            .iter()
            .map(|endpoint| endpoint.synch_address)
            .filter(|address| *address != 0)
            .collect();
        for endpoint in endpoints.iter_mut() {
            endpoint.classify(sub_class, &synch_addresses);
        }

        let kind = match sub_class {
            uac::SUBCLASS_AUDIO_CONTROL => {
                SettingKind::AudioControl(Self::parse_control(descriptors, category)?)
            }
            uac::SUBCLASS_AUDIO_STREAMING => {
                SettingKind::AudioStreaming(Self::parse_streaming(descriptors)?)
            }
            uac::SUBCLASS_MIDI_STREAMING => {
                SettingKind::MidiStreaming(Self::parse_midi(descriptors)?)
            }
            _ => SettingKind::Other {
                raw: concat(descriptors),
            },
        };

        Ok(Self {
            interface_number: iface.number,
            alternate_setting: iface.alternate_setting,
            class: iface.class,
            sub_class: iface.sub_class,
            protocol: iface.protocol,
            interface_str: iface.interface_str,
            endpoints,
            kind,
        })
    }

    fn parse_control(
        descriptors: &[Descriptor],
        category: u8,
    ) -> Result<ControlSetting, ParseError> {
        let mut setting = ControlSetting {
            category,
            ..ControlSetting::default()
        };
        let header = descriptors.iter().find(|desc| {
            desc.is(DescriptorKind::ClassInterface) && desc.subtype() == Some(v1::HEADER)
        });
        if let Some(header) = header {
            let header = reader::parse_control_header(header)?;
            setting.adc = header.adc;
            setting.streaming_interfaces = header.streaming_interfaces;
        }
        setting.entities = reader::parse(&concat(descriptors))?;
        Ok(setting)
    }

    fn parse_streaming(descriptors: &[Descriptor]) -> Result<StreamingSetting, ParseError> {
        let mut setting = StreamingSetting::default();
        for desc in descriptors
            .iter()
            .filter(|desc| desc.is(DescriptorKind::ClassInterface))
        {
            match desc.subtype() {
                Some(uac::AS_GENERAL) => setting.general = Some(AsGeneral::parse(desc)?),
                Some(uac::FORMAT_TYPE) => {
                    setting.format = Some(FormatTypeDescriptor::parse(desc)?)
                }
                other => log::debug!(
                    "dropping streaming descriptor subtype {:?} at offset {}",
                    other,
                    desc.offset
                ),
            }
        }
        Ok(setting)
    }

    fn parse_midi(descriptors: &[Descriptor]) -> Result<MidiSetting, ParseError> {
        let mut setting = MidiSetting::default();
        let header = descriptors.iter().find(|desc| {
            desc.is(DescriptorKind::ClassInterface) && desc.subtype() == Some(midi::MS_HEADER)
        });
        if let Some(header) = header {
            setting.msc = reader::parse_midi_header(header)?.0;
        }
        setting.entities = reader::parse(&concat(descriptors))?;
        Ok(setting)
    }

    pub fn entities(&self) -> Option<&EntityList> {
        match &self.kind {
            SettingKind::AudioControl(control) => Some(&control.entities),
            SettingKind::MidiStreaming(midi) => Some(&midi.entities),
            _ => None,
        }
    }

    pub fn entities_mut(&mut self) -> Option<&mut EntityList> {
        match &mut self.kind {
            SettingKind::AudioControl(control) => Some(&mut control.entities),
            SettingKind::MidiStreaming(midi) => Some(&mut midi.entities),
            _ => None,
        }
    }

    pub fn streaming(&self) -> Option<&StreamingSetting> {
        match &self.kind {
            SettingKind::AudioStreaming(streaming) => Some(streaming),
            _ => None,
        }
    }

    pub fn streaming_mut(&mut self) -> Option<&mut StreamingSetting> {
        match &mut self.kind {
            SettingKind::AudioStreaming(streaming) => Some(streaming),
            _ => None,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(
            self.kind,
            SettingKind::AudioControl(_) | SettingKind::AudioStreaming(_)
        )
    }
}

fn concat(descriptors: &[Descriptor]) -> Vec<u8> {
    descriptors
        .iter()
        .flat_map(|desc| desc.bytes.iter().copied())
        .collect()
}

/// An interface with all of its alternate settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UsbInterface {
    pub number: u8,
    pub class: u8,
    pub sub_class: u8,
    pub alternates: Vec<AlternateSetting>,
    /// bAlternateSetting of the selected alternate setting.
    pub current_alternate: u8,
}

impl UsbInterface {
    pub fn new(first: AlternateSetting) -> Self {
        Self {
            number: first.interface_number,
            class: first.class,
            sub_class: first.sub_class,
            current_alternate: 0,
            alternates: vec![first],
        }
    }

    pub fn alternate(&self, alternate_setting: u8) -> Option<&AlternateSetting> {
        self.alternates
            .iter()
            .find(|alt| alt.alternate_setting == alternate_setting)
    }

    pub fn alternate_mut(&mut self, alternate_setting: u8) -> Option<&mut AlternateSetting> {
        self.alternates
            .iter_mut()
            .find(|alt| alt.alternate_setting == alternate_setting)
    }

    /// The selected alternate setting. Falls back to the first one when the selection names a
    /// setting that does not exist.
    pub fn current(&self) -> Option<&AlternateSetting> {
        self.alternate(self.current_alternate)
            .or_else(|| self.alternates.first())
    }

    pub fn current_mut(&mut self) -> Option<&mut AlternateSetting> {
        let current = self.current_alternate;
        match self.alternates.iter().position(|alt| alt.alternate_setting == current) {
            Some(index) => self.alternates.get_mut(index),
            None => self.alternates.first_mut(),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.class == uac::CLASS_AUDIO && self.sub_class == uac::SUBCLASS_AUDIO_STREAMING
    }

    pub fn is_control(&self) -> bool {
        self.class == uac::CLASS_AUDIO && self.sub_class == uac::SUBCLASS_AUDIO_CONTROL
    }
}
