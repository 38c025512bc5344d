//! Audio 1.0 descriptor fixtures.

#![allow(dead_code)]

use uacd::config::FunctionConfig;
use uacd::{AudioDevice, ReplayTransport};

pub fn device_descriptor(configurations: u8) -> Vec<u8> {
    vec![
        18, 1, 0x10, 0x01, 0, 0, 0, 8, 0x34, 0x12, 0x78, 0x56, 0x00, 0x01, 1, 2, 0,
        configurations,
    ]
}

/// Prepends a configuration header to the concatenated interface records.
pub fn configuration(value: u8, interfaces: u8, records: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = records.concat();
    let [lo, hi] = ((9 + body.len()) as u16).to_le_bytes();
    let mut bytes = vec![9, 2, lo, hi, interfaces, value, 0, 0x80, 50];
    bytes.extend(body);
    bytes
}

pub fn interface(number: u8, alternate: u8, endpoints: u8, sub_class: u8) -> Vec<u8> {
    vec![9, 4, number, alternate, endpoints, 1, sub_class, 0, 0]
}

/// Audio Control header. `body` is the length of the unit and terminal records behind it.
pub fn ac_header(body: usize, streaming: &[u8]) -> Vec<u8> {
    let length = 8 + streaming.len();
    let [lo, hi] = ((length + body) as u16).to_le_bytes();
    let mut bytes = vec![length as u8, 0x24, 1, 0x00, 0x01, lo, hi, streaming.len() as u8];
    bytes.extend(streaming);
    bytes
}

pub fn input_terminal(id: u8, terminal_type: u16, channels: u8) -> Vec<u8> {
    let [lo, hi] = terminal_type.to_le_bytes();
    vec![12, 0x24, 2, id, lo, hi, 0, channels, 0x03, 0x00, 0, 0]
}

pub fn output_terminal(id: u8, terminal_type: u16, source: u8) -> Vec<u8> {
    let [lo, hi] = terminal_type.to_le_bytes();
    vec![9, 0x24, 3, id, lo, hi, 0, source, 0]
}

/// One-byte bmaControls per channel, master first.
pub fn feature_unit(id: u8, source: u8, controls: &[u8]) -> Vec<u8> {
    let mut bytes = vec![(7 + controls.len()) as u8, 0x24, 6, id, source, 1];
    bytes.extend(controls);
    bytes.push(0);
    bytes
}

/// The Audio Control interface: header, then `records`.
pub fn control_interface(number: u8, streaming: &[u8], records: &[Vec<u8>]) -> Vec<u8> {
    let body: usize = records.iter().map(Vec::len).sum();
    let mut bytes = interface(number, 0, 0, 1);
    bytes.extend(ac_header(body, streaming));
    bytes.extend(records.concat());
    bytes
}

pub fn as_general(terminal_link: u8, format_tag: u16) -> Vec<u8> {
    let [lo, hi] = format_tag.to_le_bytes();
    vec![7, 0x24, 1, terminal_link, 1, lo, hi]
}

pub fn format_type_i(channels: u8, rates: &[u32]) -> Vec<u8> {
    let mut bytes = vec![(8 + 3 * rates.len()) as u8, 0x24, 2, 1, channels, 2, 16];
    bytes.push(rates.len() as u8);
    for rate in rates {
        bytes.extend(&rate.to_le_bytes()[..3]);
    }
    bytes
}

/// Adaptive isochronous OUT data endpoint.
pub fn iso_endpoint(address: u8) -> Vec<u8> {
    vec![9, 5, address, 0x09, 0xC0, 0x00, 1, 0, 0]
}

pub fn cs_iso_endpoint(attributes: u8) -> Vec<u8> {
    vec![7, 0x25, 1, attributes, 0, 0, 0]
}

/// A streaming alternate setting with one data endpoint at address 1.
pub fn streaming_alternate(number: u8, alternate: u8, terminal: u8, rates: &[u32]) -> Vec<u8> {
    [
        interface(number, alternate, 1, 2),
        as_general(terminal, 0x0001),
        format_type_i(2, rates),
        iso_endpoint(0x01),
        cs_iso_endpoint(0x01),
    ]
    .concat()
}

/// A stereo USB speaker: input terminal 1, feature unit 2 (master mute and volume, volume on
/// both channels), speaker terminal 3. Interface 1 streams at 48 kHz in alternate setting 1 and
/// at 96 kHz in alternate setting 2.
pub fn speaker_configuration() -> Vec<u8> {
    configuration(
        1,
        2,
        &[
            control_interface(
                0,
                &[1],
                &[
                    input_terminal(1, 0x0101, 2),
                    feature_unit(2, 1, &[0x03, 0x02, 0x02]),
                    output_terminal(3, 0x0301, 2),
                ],
            ),
            interface(1, 0, 0, 2),
            streaming_alternate(1, 1, 1, &[48_000]),
            streaming_alternate(1, 2, 1, &[96_000]),
        ],
    )
}

pub fn transport(configurations: Vec<Vec<u8>>) -> ReplayTransport {
    ReplayTransport::new(device_descriptor(configurations.len() as u8), configurations)
}

pub fn speaker() -> AudioDevice<ReplayTransport> {
    AudioDevice::attach(
        transport(vec![speaker_configuration()]),
        &FunctionConfig::default(),
    )
    .unwrap()
}
