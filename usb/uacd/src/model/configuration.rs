use serde::Serialize;
use smallvec::SmallVec;

use super::interface::{AlternateSetting, SettingKind, UsbInterface};
use crate::config::FunctionConfig;
use crate::entity::{ChannelCluster, ClockSource, EntityList};
use crate::error::ParseError;
use crate::reader::{Descriptor, DescriptorIter};
use crate::topology;
use crate::usb::{ConfigDescriptor, DescriptorKind};

/// One configuration of the device, indexed by interface.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UsbConfiguration {
    pub configuration_value: u8,
    pub configuration_str: u8,
    pub attributes: u8,
    pub max_power: u8,
    /// Emit an Interface Association Descriptor before each audio function.
    pub interface_association: bool,
    pub interfaces: Vec<UsbInterface>,
    /// The configuration descriptor as the device returned it.
    #[serde(skip)]
    pub raw: Vec<u8>,
}

/// Where one streaming alternate setting plugs into its Audio Control interface.
struct StreamBinding {
    streaming: u8,
    alternate: u8,
    control: u8,
    terminal: u8,
}

impl UsbConfiguration {
    /// Indexes a complete configuration descriptor.
    ///
    /// Interfaces are split into alternate settings, the Audio Control entities get their clocks
    /// and every streaming format registers its rates on the clock of its terminal.
    pub fn parse(raw: Vec<u8>, function: &FunctionConfig) -> Result<Self, ParseError> {
        let header = plain::from_bytes::<ConfigDescriptor>(&raw)
            .map(|header| *header)
            .map_err(|_| ParseError::Truncated {
                offset: 0,
                needed: ConfigDescriptor::SIZE,
                available: raw.len(),
            })?;
        if header.kind != DescriptorKind::Configuration as u8 {
            return Err(ParseError::UnknownRequiredField {
                offset: 0,
                field: "bDescriptorType",
            });
        }

        let total_length = usize::from(header.total_length);
        if total_length > raw.len() {
            log::warn!(
                "configuration {} declares {} bytes, only {} were read",
                header.configuration_value,
                total_length,
                raw.len()
            );
        }
        let end = total_length.min(raw.len());

        let mut interfaces: Vec<UsbInterface> = Vec::new();
        for group in group_by_interface(&raw[..end])? {
            let alt = AlternateSetting::parse(&group, function.category)?;
            match interfaces
                .iter_mut()
                .find(|iface| iface.number == alt.interface_number)
            {
                Some(iface) => iface.alternates.push(alt),
                None => interfaces.push(UsbInterface::new(alt)),
            }
        }

        let mut config = Self {
            configuration_value: header.configuration_value,
            configuration_str: header.configuration_str,
            attributes: header.attributes,
            max_power: header.max_power,
            interface_association: function.interface_association,
            interfaces,
            raw,
        };
        config.link_clocks()?;
        config.bind_streams();
        Ok(config)
    }

    fn link_clocks(&mut self) -> Result<(), ParseError> {
        for iface in self.interfaces.iter_mut().filter(|iface| iface.is_control()) {
            for alt in iface.alternates.iter_mut() {
                if let SettingKind::AudioControl(control) = &mut alt.kind {
                    topology::link_clocks(&mut control.entities)?;
                }
            }
        }
        Ok(())
    }

    fn bind_streams(&mut self) {
        let mut bindings = Vec::new();
        for iface in self.interfaces.iter().filter(|iface| iface.is_control()) {
            let streaming_interfaces = match iface.alternates.first().map(|alt| &alt.kind) {
                Some(SettingKind::AudioControl(control)) => control.streaming_interfaces.clone(),
                _ => continue,
            };
            for number in streaming_interfaces {
                let streaming = match self.interface(number) {
                    Some(streaming) if streaming.is_streaming() => streaming,
                    Some(_) => continue,
                    None => {
                        log::warn!(
                            "interface {} lists missing streaming interface {}",
                            iface.number,
                            number
                        );
                        continue;
                    }
                };
                for alt in &streaming.alternates {
                    if let Some(setting) = alt.streaming() {
                        bindings.push(StreamBinding {
                            streaming: number,
                            alternate: alt.alternate_setting,
                            control: iface.number,
                            terminal: setting.general.map_or(0, |general| general.terminal_link),
                        });
                    }
                }
            }
        }

        for binding in bindings {
            let format = self
                .interface(binding.streaming)
                .and_then(|iface| iface.alternate(binding.alternate))
                .and_then(|alt| alt.streaming())
                .and_then(|streaming| streaming.format.clone());

            let mut clock_id = None;
            let mut cluster = ChannelCluster::default();
            let entities = match binding.terminal {
                0 => None,
                _ => self.control_entities_mut(binding.control),
            };
            if let Some(entities) = entities {
                match entities.get(binding.terminal) {
                    Some(terminal) => {
                        clock_id = terminal.clock_id();
                        cluster = entities
                            .channel_cluster(binding.terminal)
                            .unwrap_or_default();
                    }
                    None => log::warn!(
                        "streaming interface {} links missing terminal {}",
                        binding.streaming,
                        binding.terminal
                    ),
                }
                let clock = clock_id.and_then(|id| entities.clock_source_mut(id));
                if let (Some(clock), Some(format)) = (clock, format.as_ref()) {
                    topology::register_stream_rates(clock, format);
                }
            }

            let channels = format.as_ref().and_then(|format| format.channels());
            if let Some(channels) = channels {
                if channels != cluster.channels {
                    cluster = ChannelCluster {
                        channels,
                        config: 0,
                        names_str: 0,
                    };
                }
            }

            if let Some(streaming) = self
                .interface_mut(binding.streaming)
                .and_then(|iface| iface.alternate_mut(binding.alternate))
                .and_then(|alt| alt.streaming_mut())
            {
                streaming.control_interface = Some(binding.control);
                streaming.clock_id = clock_id;
                streaming.cluster = cluster;
            }
        }
    }

    pub fn interface(&self, number: u8) -> Option<&UsbInterface> {
        self.interfaces.iter().find(|iface| iface.number == number)
    }

    pub fn interface_mut(&mut self, number: u8) -> Option<&mut UsbInterface> {
        self.interfaces.iter_mut().find(|iface| iface.number == number)
    }

    /// The entities of an Audio Control interface. Audio Control interfaces have a single
    /// alternate setting.
    pub fn control_entities(&self, control: u8) -> Option<&EntityList> {
        self.interface(control)
            .filter(|iface| iface.is_control())
            .and_then(|iface| iface.alternates.first())
            .and_then(AlternateSetting::entities)
    }

    pub fn control_entities_mut(&mut self, control: u8) -> Option<&mut EntityList> {
        self.interface_mut(control)
            .filter(|iface| iface.is_control())
            .and_then(|iface| iface.alternates.first_mut())
            .and_then(AlternateSetting::entities_mut)
    }

    /// The clock driving the alternate setting `alternate` of a streaming interface.
    pub fn stream_clock(&self, streaming: u8, alternate: u8) -> Option<&ClockSource> {
        let setting = self.interface(streaming)?.alternate(alternate)?.streaming()?;
        self.control_entities(setting.control_interface?)?
            .clock_source(setting.clock_id?)
    }

    /// Isochronous data endpoints that have to follow a rate change of `clock`: the endpoints of
    /// the selected alternate setting of every streaming interface clocked by it, when they accept
    /// the sampling frequency control.
    pub fn clocked_endpoints(&self, control: u8, clock: u8) -> SmallVec<[u8; 4]> {
        self.interfaces
            .iter()
            .filter(|iface| iface.is_streaming())
            .filter_map(UsbInterface::current)
            .filter(|alt| {
                alt.streaming().map_or(false, |streaming| {
                    streaming.control_interface == Some(control) && streaming.clock_id == Some(clock)
                })
            })
            .flat_map(|alt| alt.endpoints.iter())
            .filter(|endpoint| endpoint.has_sampling_frequency_control())
            .map(|endpoint| endpoint.address)
            .collect()
    }

    /// The audio functions of this configuration, as (first interface, interface count).
    pub fn functions(&self) -> SmallVec<[(u8, u8); 2]> {
        self.interfaces
            .iter()
            .filter(|iface| iface.is_control())
            .filter_map(|iface| match &iface.alternates.first()?.kind {
                SettingKind::AudioControl(control) => {
                    let first = control
                        .streaming_interfaces
                        .iter()
                        .copied()
                        .fold(iface.number, u8::min);
                    Some((first, 1 + control.streaming_interfaces.len() as u8))
                }
                _ => None,
            })
            .collect()
    }

    /// Resets every interface to alternate setting 0.
    pub fn reset_alternates(&mut self) {
        for iface in self.interfaces.iter_mut() {
            iface.current_alternate = 0;
        }
    }
}

/// Splits a configuration into the descriptors of each alternate setting. Interface Association
/// Descriptors of the source are dropped; the writer synthesizes its own.
fn group_by_interface(bytes: &[u8]) -> Result<Vec<Vec<Descriptor>>, ParseError> {
    let mut groups: Vec<Vec<Descriptor>> = Vec::new();
    for desc in DescriptorIter::new(bytes) {
        let desc = desc?;
        match DescriptorKind::from_u8(desc.kind()) {
            Some(DescriptorKind::Configuration) => (),
            Some(DescriptorKind::InterfaceAssociation) => {
                log::debug!("dropping interface association at offset {}", desc.offset)
            }
            Some(DescriptorKind::Interface) => groups.push(vec![desc]),
            _ => match groups.last_mut() {
                Some(group) => group.push(desc),
                None => log::debug!(
                    "ignoring descriptor type {:#x} before the first interface",
                    desc.kind()
                ),
            },
        }
    }
    Ok(groups)
}
