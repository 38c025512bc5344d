use redox_log::{OutputBuilder, RedoxLogger};

/// Logs to stderr only; the driver runs on the host side of a recording.
pub fn setup_logging(level: log::LevelFilter) {
    let logger = RedoxLogger::new().with_output(
        OutputBuilder::stderr()
            .with_filter(level)
            .with_ansi_escape_codes()
            .flush_on_newline(true)
            .build(),
    );

    logger.enable().expect("failed to set default logger");
}
