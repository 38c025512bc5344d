//! The per-device entry points used by the driver plumbing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::FunctionConfig;
use crate::dispatch::{self, ControlRequest, ControlResponse, Dispatcher};
use crate::error::{AttachError, DispatchError, WriteError};
use crate::model::{UsbConfiguration, UsbDevice};
use crate::requests;
use crate::transport::{DeviceReqData, DeviceTransport};
use crate::usb::{DeviceDescriptor, Setup};
use crate::writer::Uac2Descriptor;

struct State<T> {
    device: UsbDevice,
    transport: T,
}

/// An Audio 1.0 device presented as an Audio 2.0 one.
///
/// All requests of one device are serialized on a single lock: control requests, alternate
/// setting selection and descriptor reads share the clock and selection state.
pub struct AudioDevice<T> {
    state: Mutex<State<T>>,
}

impl<T: DeviceTransport> AudioDevice<T> {
    /// Enumerates the device and builds the Audio 2.0 view of every configuration.
    pub fn attach(mut transport: T, function: &FunctionConfig) -> Result<Self, AttachError> {
        let device = UsbDevice::enumerate(&mut transport, function)?;
        log::info!(
            "attached {:04x}:{:04x} with {} configurations",
            { device.descriptor.vendor },
            { device.descriptor.product },
            device.configurations.len()
        );
        Ok(Self {
            state: Mutex::new(State { device, transport }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The device descriptor as an Audio 2.0 host has to see it.
    pub fn get_device_descriptor(&self) -> [u8; DeviceDescriptor::SIZE] {
        self.lock()
            .device
            .descriptor
            .with_interface_association()
            .to_bytes()
    }

    /// Writes the synthesized configuration descriptor `index` into `buffer`.
    ///
    /// Like GET_DESCRIPTOR, a buffer shorter than the descriptor receives its first bytes only.
    /// A configuration that could not be parsed has no descriptor and writes nothing.
    pub fn get_configuration_descriptor(
        &self,
        index: u8,
        buffer: &mut [u8],
    ) -> Result<usize, WriteError> {
        let state = self.lock();
        let configuration = match state.device.configuration(index) {
            Some(configuration) => configuration,
            None => {
                log::warn!("configuration {} is not available", index);
                return Ok(0);
            }
        };
        if buffer.len() >= configuration.serialized_size() {
            return configuration.serialize_into(buffer);
        }
        let bytes = configuration.to_bytes()?;
        buffer.copy_from_slice(&bytes[..buffer.len()]);
        Ok(buffer.len())
    }

    /// The synthesized configuration descriptor `index`, whole.
    pub fn configuration_descriptor(&self, index: u8) -> Option<Result<Vec<u8>, WriteError>> {
        let state = self.lock();
        state
            .device
            .configuration(index)
            .map(UsbConfiguration::to_bytes)
    }

    /// Selects the configuration with bConfigurationValue `value`, or unconfigures the device.
    pub fn select_configuration(&self, value: Option<u8>) -> Result<(), DispatchError> {
        let mut state = self.lock();
        let state = &mut *state;
        let index = match value {
            Some(value) => Some(
                state
                    .device
                    .configuration_index(value)
                    .ok_or(DispatchError::InvalidRequest("unknown configuration"))?,
            ),
            None => None,
        };

        let setup = Setup::set_configuration(value.unwrap_or(0));
        state.transport.request(&setup, DeviceReqData::NoData)?;
        state.device.current_configuration = index;
        if let Some(configuration) = state.device.current_mut() {
            configuration.reset_alternates();
        }
        log::debug!("configuration {:?} selected", value);
        Ok(())
    }

    /// Selects an alternate setting and returns the one actually in use, which may differ from
    /// `requested_alt` for streaming interfaces.
    pub fn select_interface(
        &self,
        interface_number: u8,
        requested_alt: u8,
    ) -> Result<u8, DispatchError> {
        let mut state = self.lock();
        let state = &mut *state;
        let configuration = state
            .device
            .current_mut()
            .ok_or(DispatchError::UnknownInterface(interface_number))?;
        let actual =
            dispatch::match_alternate_setting(configuration, interface_number, requested_alt)?;

        let setup = Setup::set_interface(interface_number, actual);
        state.transport.request(&setup, DeviceReqData::NoData)?;
        if let Some(iface) = configuration.interface_mut(interface_number) {
            iface.current_alternate = actual;
        }

        // Audio 1.0 endpoints forget their rate when the interface changes.
        let frequency = configuration
            .stream_clock(interface_number, actual)
            .map(|clock| clock.current_frequency)
            .filter(|frequency| *frequency != 0);
        let endpoints = configuration
            .interface(interface_number)
            .and_then(|iface| iface.current())
            .map(|alt| {
                alt.endpoints
                    .iter()
                    .filter(|endpoint| endpoint.has_sampling_frequency_control())
                    .map(|endpoint| endpoint.address)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if let Some(frequency) = frequency {
            for endpoint in endpoints {
                requests::set_endpoint_frequency(&mut state.transport, endpoint, frequency)?;
            }
        }
        Ok(actual)
    }

    pub fn handle_class_request(
        &self,
        request: &ControlRequest,
    ) -> Result<ControlResponse, DispatchError> {
        let mut state = self.lock();
        let state = &mut *state;
        let configuration = state
            .device
            .current_mut()
            .ok_or(DispatchError::UnknownInterface(request.interface_number))?;
        let result = Dispatcher::new(configuration, &mut state.transport).handle(request);
        if let Err(error) = &result {
            log::debug!(
                "request to entity {} of interface {} failed: {}",
                request.entity_id,
                request.interface_number,
                error
            );
        }
        result
    }

    /// Runs `f` on the indexed device.
    pub fn with_device<R>(&self, f: impl FnOnce(&UsbDevice) -> R) -> R {
        f(&self.lock().device)
    }

    /// Runs `f` on the transport, with the device lock held.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock().transport)
    }
}
