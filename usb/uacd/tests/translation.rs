use uacd::config::FunctionConfig;
use uacd::entity::{EntityKind, EntityList, FrequencyRange};
use uacd::model::{SettingKind, UsbConfiguration};
use uacd::uac::{self, v2};
use uacd::usb::DescriptorKind;
use uacd::{topology, AudioDevice, Uac2Descriptor};

mod util;

/// (bLength, bDescriptorType, bDescriptorSubtype) of every record, in order.
fn records(bytes: &[u8]) -> Vec<(u8, u8, u8)> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let length = bytes[offset];
        assert_ne!(length, 0, "zero-length record at offset {}", offset);
        let subtype = bytes.get(offset + 2).copied().unwrap_or(0);
        records.push((length, bytes[offset + 1], subtype));
        offset += usize::from(length);
    }
    assert_eq!(offset, bytes.len(), "last record overruns the descriptor");
    records
}

fn control_entities(configuration: &UsbConfiguration) -> &EntityList {
    configuration.control_entities(0).unwrap()
}

/// A recording mixer: a USB stream (1) and a microphone (4) mixed by unit 5, selected by 6,
/// run through a reverberation unit 7 and a vendor extension 8 to the streaming terminal 3.
/// Interface 1 is a MIDI Streaming interface with one jack pair.
fn mixer_configuration() -> Vec<u8> {
    let mixer = vec![13, 0x24, 4, 5, 2, 1, 4, 2, 0x03, 0x00, 0, 0b1111_1100, 0];
    let selector = vec![8, 0x24, 5, 6, 2, 5, 1, 0];
    let reverb = vec![15, 0x24, 7, 7, 0x04, 0x00, 1, 6, 2, 0x03, 0x00, 0, 1, 0b0001_1101, 0];
    let extension = vec![15, 0x24, 8, 8, 0x34, 0x12, 1, 7, 2, 0x03, 0x00, 0, 1, 0b1, 0];

    let midi = [
        util::interface(1, 0, 1, 3),
        vec![7, 0x24, 1, 0x00, 0x01, 36, 0],
        vec![6, 0x24, 2, 1, 1, 0],
        vec![9, 0x24, 3, 1, 2, 1, 1, 1, 0],
        vec![9, 5, 0x01, 0x02, 0x40, 0x00, 0, 0, 0],
        vec![5, 0x25, 1, 1, 1],
    ]
    .concat();

    util::configuration(
        1,
        2,
        &[
            util::control_interface(
                0,
                &[1],
                &[
                    util::input_terminal(1, 0x0101, 2),
                    util::input_terminal(4, 0x0201, 1),
                    mixer,
                    selector,
                    reverb,
                    extension,
                    util::output_terminal(3, 0x0101, 8),
                ],
            ),
            midi,
        ],
    )
}

#[test]
fn speaker_end_to_end() {
    let device = util::speaker();
    let bytes = device.configuration_descriptor(0).unwrap().unwrap();

    let interface = DescriptorKind::Interface as u8;
    let cs_interface = DescriptorKind::ClassInterface as u8;
    let cs_endpoint = DescriptorKind::ClassEndpoint as u8;
    let endpoint = DescriptorKind::Endpoint as u8;
    let streaming_alternate = [
        (9, interface, 1),
        (16, cs_interface, uac::AS_GENERAL),
        (6, cs_interface, uac::FORMAT_TYPE),
        (7, endpoint, 0x01),
        (8, cs_endpoint, uac::EP_GENERAL),
    ];
    let mut expected = vec![
        (9, DescriptorKind::Configuration as u8, 191),
        (8, DescriptorKind::InterfaceAssociation as u8, 0),
        (9, interface, 0),
        (9, cs_interface, v2::HEADER),
        (17, cs_interface, v2::INPUT_TERMINAL),
        (18, cs_interface, v2::FEATURE_UNIT),
        (12, cs_interface, v2::OUTPUT_TERMINAL),
        (8, cs_interface, v2::CLOCK_SOURCE),
        (9, interface, 1),
    ];
    expected.extend(streaming_alternate);
    expected.extend(streaming_alternate);
    // Standard records carry an interface number or endpoint address where class records
    // have their subtype.
    assert_eq!(records(&bytes), expected);

    assert_eq!(bytes.len(), 191);
    assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 191);

    // Every Audio interface now claims protocol IP_VERSION_02_00.
    assert_eq!(bytes[9 + 8 + 7], uac::IP_VERSION_02_00);
    // The Audio Control header covers itself and the four entities.
    let header = 9 + 8 + 9;
    assert_eq!(u16::from_le_bytes([bytes[header + 6], bytes[header + 7]]), 64);

    device.with_device(|device| {
        let entities = control_entities(device.configuration(0).unwrap());
        assert_eq!(entities.len(), 4);
        assert_eq!(entities.clock_source_count(), 1);
        assert_eq!(entities.get(1).unwrap().clock_id(), Some(4));
        assert_eq!(entities.get(3).unwrap().clock_id(), Some(4));
    });
}

#[test]
fn device_descriptor_announces_interface_association() {
    let device = util::speaker();
    let bytes = device.get_device_descriptor();
    assert_eq!(bytes.len(), 18);
    assert_eq!(&bytes[2..7], &[0x00, 0x02, 0xEF, 0x02, 0x01]);
    // Vendor and product are untouched.
    assert_eq!(&bytes[8..12], &[0x34, 0x12, 0x78, 0x56]);
}

#[test]
fn clock_rates_come_from_every_streaming_setting() {
    let device = util::speaker();
    device.with_device(|device| {
        let entities = control_entities(device.configuration(0).unwrap());
        let clock = entities.clock_source(4).unwrap();
        assert_eq!(
            clock.ranges,
            vec![
                FrequencyRange {
                    min: 48_000,
                    max: 48_000,
                    resolution: 0
                },
                FrequencyRange {
                    min: 96_000,
                    max: 96_000,
                    resolution: 0
                },
            ]
        );
        assert_eq!(clock.current_frequency, 48_000);
        assert!(topology::is_frequency_supported(clock, 96_000));
        assert!(!topology::is_frequency_supported(clock, 44_100));
    });

    // Two discrete rates make the clock programmable.
    let bytes = device.configuration_descriptor(0).unwrap().unwrap();
    let clock = 9 + 8 + 9 + 9 + 17 + 18 + 12;
    assert_eq!(&bytes[clock..clock + 4], &[8, 0x24, v2::CLOCK_SOURCE, 4]);
    assert_eq!(bytes[clock + 4], v2::CLOCK_TYPE_INTERNAL_PROGRAMMABLE);
    assert_eq!(bytes[clock + 5], 0b0111);
}

#[test]
fn linking_again_changes_nothing() {
    let device = util::speaker();
    device.with_device(|device| {
        let mut entities = control_entities(device.configuration(0).unwrap()).clone();
        let before = entities.clone();
        topology::link_clocks(&mut entities).unwrap();
        assert_eq!(entities, before);
    });
}

#[test]
fn every_record_describes_its_own_length() {
    let raw = mixer_configuration();
    let configuration = UsbConfiguration::parse(raw, &FunctionConfig::default()).unwrap();

    let entities = control_entities(&configuration);
    // Seven entities and a clock for each input terminal.
    assert_eq!(entities.len(), 9);
    assert_eq!(entities.get(3).unwrap().clock_id(), Some(9));
    for entity in entities {
        let bytes = entity.to_bytes().unwrap();
        assert_eq!(bytes.len(), entity.serialized_size(), "entity {}", entity.id);
        assert_eq!(usize::from(bytes[0]), bytes.len(), "entity {}", entity.id);
    }

    let sizes: Vec<_> = entities
        .iter()
        .map(|entity| (entity.id, entity.serialized_size()))
        .collect();
    assert_eq!(
        sizes,
        vec![(1, 17), (4, 17), (5, 16), (6, 9), (7, 20), (8, 16), (3, 12), (9, 8), (10, 8)]
    );

    let bytes = configuration.to_bytes().unwrap();
    assert_eq!(bytes.len(), configuration.serialized_size());
    assert_eq!(
        usize::from(u16::from_le_bytes([bytes[2], bytes[3]])),
        bytes.len()
    );
    let records = records(&bytes);

    // The reverberation unit became an effect unit.
    assert!(records.contains(&(20, 0x24, v2::EFFECT_UNIT)));
    // MIDI keeps its 9-byte endpoint, followed by MS_GENERAL.
    assert!(records.contains(&(9, DescriptorKind::Endpoint as u8, 0x01)));
    assert!(records.contains(&(5, 0x25, uac::midi::MS_GENERAL)));

    // One association covering both interfaces.
    let iad = &bytes[9..17];
    assert_eq!(iad, &[8, 11, 0, 2, 1, 0, 0x20, 0]);
}

#[test]
fn midi_interface_keeps_its_jacks() {
    let configuration =
        UsbConfiguration::parse(mixer_configuration(), &FunctionConfig::default()).unwrap();
    let midi = configuration.interface(1).unwrap();
    match &midi.alternates[0].kind {
        SettingKind::MidiStreaming(setting) => {
            assert_eq!(setting.msc, 0x0100);
            assert_eq!(setting.entities.len(), 2);
            assert!(matches!(
                setting.entities.get(2).unwrap().kind,
                EntityKind::MidiOutJack(_)
            ));
        }
        other => panic!("expected a MIDI streaming setting, got {:?}", other),
    }
}

#[test]
fn short_buffer_receives_a_prefix() {
    let device = util::speaker();
    let whole = device.configuration_descriptor(0).unwrap().unwrap();

    let mut header = [0u8; 9];
    assert_eq!(device.get_configuration_descriptor(0, &mut header), Ok(9));
    assert_eq!(&header[..], &whole[..9]);

    let mut buffer = vec![0u8; 512];
    assert_eq!(
        device.get_configuration_descriptor(0, &mut buffer),
        Ok(whole.len())
    );
    assert_eq!(&buffer[..whole.len()], &whole[..]);

    assert_eq!(device.get_configuration_descriptor(3, &mut buffer), Ok(0));
    assert!(device.configuration_descriptor(3).is_none());
}

#[test]
fn oversized_header_length_is_clamped() {
    let mut configuration = util::speaker_configuration();
    // The Audio Control header sits after the configuration and interface descriptors.
    let header = 9 + 9;
    assert_eq!(&configuration[header..header + 3], &[9, 0x24, 1]);
    configuration[header + 5] = 0x00;
    configuration[header + 6] = 0x04;

    let device = AudioDevice::attach(
        util::transport(vec![configuration]),
        &FunctionConfig::default(),
    )
    .unwrap();
    device.with_device(|device| {
        let entities = control_entities(device.configuration(0).unwrap());
        assert_eq!(entities.len(), 4);
    });
}

#[test]
fn unusable_configuration_is_skipped() {
    // A feature unit pointing at an entity that does not exist.
    let broken = util::configuration(
        2,
        1,
        &[util::control_interface(
            0,
            &[],
            &[util::feature_unit(2, 7, &[0x01])],
        )],
    );
    let device = AudioDevice::attach(
        util::transport(vec![broken, util::speaker_configuration()]),
        &FunctionConfig::default(),
    )
    .unwrap();

    assert!(device.configuration_descriptor(0).is_none());
    assert!(device.configuration_descriptor(1).is_some());
    assert!(device.select_configuration(Some(2)).is_err());
    assert!(device.select_configuration(Some(1)).is_ok());
}

#[test]
fn association_can_be_turned_off() {
    let function = FunctionConfig {
        interface_association: false,
        ..FunctionConfig::default()
    };
    let device = AudioDevice::attach(util::transport(vec![util::speaker_configuration()]), &function)
        .unwrap();
    let bytes = device.configuration_descriptor(0).unwrap().unwrap();
    assert_eq!(bytes.len(), 191 - 8);
    assert_eq!(bytes[10], DescriptorKind::Interface as u8);
}

#[test]
fn topology_serializes_to_json() {
    let device = util::speaker();
    let json = device
        .with_device(|device| serde_json::to_value(device))
        .unwrap();
    let interfaces = &json["configurations"][0]["interfaces"];
    assert_eq!(interfaces.as_array().unwrap().len(), 2);
    assert_eq!(interfaces[1]["alternates"].as_array().unwrap().len(), 3);
}
