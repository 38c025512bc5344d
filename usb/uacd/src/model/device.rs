use serde::Serialize;

use super::configuration::UsbConfiguration;
use crate::config::FunctionConfig;
use crate::error::{AttachError, TransportError};
use crate::transport::{DeviceReqData, DeviceTransport};
use crate::usb::{ConfigDescriptor, DescriptorKind, DeviceDescriptor, Setup};

/// A device and every configuration it offers.
#[derive(Clone, Debug, Serialize)]
pub struct UsbDevice {
    #[serde(skip)]
    pub descriptor: DeviceDescriptor,
    /// One entry per configuration index. A configuration that could not be parsed is `None`
    /// and cannot be selected.
    pub configurations: Vec<Option<UsbConfiguration>>,
    /// Index into `configurations` of the selected configuration.
    pub current_configuration: Option<u8>,
}

impl UsbDevice {
    /// Reads the device descriptor and every configuration descriptor, and indexes them.
    pub fn enumerate<T: DeviceTransport>(
        transport: &mut T,
        function: &FunctionConfig,
    ) -> Result<Self, AttachError> {
        let mut bytes = [0u8; DeviceDescriptor::SIZE];
        let setup = Setup::get_descriptor(
            DescriptorKind::Device,
            0,
            0,
            DeviceDescriptor::SIZE as u16,
        );
        transport.request_exact(&setup, DeviceReqData::In(&mut bytes))?;
        let descriptor = *plain::from_bytes::<DeviceDescriptor>(&bytes)
            .map_err(|_| AttachError::InvalidDescriptor("device"))?;
        if descriptor.kind != DescriptorKind::Device as u8 {
            return Err(AttachError::InvalidDescriptor("device"));
        }

        let mut configurations = Vec::new();
        for index in 0..descriptor.configurations {
            let raw = read_configuration(transport, index)?;
            match UsbConfiguration::parse(raw, function) {
                Ok(config) => {
                    log::debug!(
                        "configuration {} has {} interfaces",
                        index,
                        config.interfaces.len()
                    );
                    configurations.push(Some(config));
                }
                Err(error) => {
                    log::error!("{}", AttachError::Parse { index, error });
                    configurations.push(None);
                }
            }
        }
        if configurations.iter().all(Option::is_none) {
            return Err(AttachError::NoUsableConfiguration);
        }

        Ok(Self {
            descriptor,
            configurations,
            current_configuration: None,
        })
    }

    pub fn configuration(&self, index: u8) -> Option<&UsbConfiguration> {
        self.configurations.get(usize::from(index))?.as_ref()
    }

    pub fn current(&self) -> Option<&UsbConfiguration> {
        self.configuration(self.current_configuration?)
    }

    pub fn current_mut(&mut self) -> Option<&mut UsbConfiguration> {
        let index = usize::from(self.current_configuration?);
        self.configurations.get_mut(index)?.as_mut()
    }

    /// Finds the configuration with bConfigurationValue `value`.
    pub fn configuration_index(&self, value: u8) -> Option<u8> {
        self.configurations
            .iter()
            .position(|config| {
                config
                    .as_ref()
                    .map_or(false, |config| config.configuration_value == value)
            })
            .map(|index| index as u8)
    }
}

/// Reads the 9-byte header of configuration `index`, then the whole configuration.
fn read_configuration<T: DeviceTransport>(
    transport: &mut T,
    index: u8,
) -> Result<Vec<u8>, TransportError> {
    let mut header = [0u8; ConfigDescriptor::SIZE];
    let setup = Setup::get_descriptor(
        DescriptorKind::Configuration,
        index,
        0,
        ConfigDescriptor::SIZE as u16,
    );
    transport.request_exact(&setup, DeviceReqData::In(&mut header))?;
    let total_length = u16::from_le_bytes([header[2], header[3]]);

    let mut raw = vec![0u8; usize::from(total_length).max(ConfigDescriptor::SIZE)];
    let setup = Setup::get_descriptor(DescriptorKind::Configuration, index, 0, raw.len() as u16);
    let read = transport.request(&setup, DeviceReqData::In(&mut raw))?;
    raw.truncate(read);
    Ok(raw)
}
