//! Logging setup for library consumers.
//!
//! The library itself only emits through the `log` facade; this helper wires
//! a `fern` console logger for binaries and scripts that want the client's
//! request/cache/retry chatter on stdout.

use log::LevelFilter;

use crate::config::LoggingConfig;

/// Install a console logger honoring the configuration flags. Does nothing
/// when logging is disabled. Safe to call once per process.
pub fn init(config: &LoggingConfig) -> Result<(), fern::InitError> {
    if !config.enabled {
        return Ok(());
    }

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
