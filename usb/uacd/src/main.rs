use std::path::Path;
use std::{env, fs, process};

use uacd::config::{Config, DEFAULT_CONFIG};
use uacd::{AudioDevice, ReplayTransport};

mod logger;

fn main() {
    let mut args = env::args().skip(1);

    const USAGE: &'static str = "uacd <descriptor dump> [config.toml]";

    let dump_path = args.next().expect(USAGE);
    let config = match args.next() {
        Some(path) => Config::load(Path::new(&path)).unwrap_or_else(|error| {
            eprintln!("uacd: {}", error);
            process::exit(1);
        }),
        None => DEFAULT_CONFIG.clone(),
    };

    logger::setup_logging(config.log.level_filter());

    let dump = fs::read(&dump_path).unwrap_or_else(|error| {
        log::error!("failed to read {}: {}", dump_path, error);
        process::exit(1);
    });
    let transport = ReplayTransport::from_dump(&dump).unwrap_or_else(|error| {
        log::error!("invalid dump {}: {}", dump_path, error);
        process::exit(1);
    });
    let device = AudioDevice::attach(transport, &config.function).unwrap_or_else(|error| {
        log::error!("failed to attach {}: {}", dump_path, error);
        process::exit(1);
    });

    println!("device: {}", hex(&device.get_device_descriptor()));
    let count = device.with_device(|device| device.configurations.len());
    for index in 0..count as u8 {
        match device.configuration_descriptor(index) {
            Some(Ok(bytes)) => println!("configuration {}: {}", index, hex(&bytes)),
            Some(Err(error)) => log::error!("configuration {}: {}", index, error),
            None => log::warn!("configuration {} could not be parsed", index),
        }
    }

    match device.with_device(|device| serde_json::to_string_pretty(device)) {
        Ok(json) => println!("{}", json),
        Err(error) => log::error!("failed to serialize topology: {}", error),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}
