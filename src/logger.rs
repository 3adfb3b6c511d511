use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;

/// Initializes the global logger, writing to stderr so that stdout only carries the plan.
///
/// Log level is controlled by the `RUST_LOG` environment variable,
/// e.g. `RUST_LOG=debug`. It defaults to `info`.
///
/// # Errors
/// - If a global logger was already installed.
pub fn init() -> Result<(), log::SetLoggerError> {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ));
        })
        .chain(std::io::stderr())
        .apply()?;

    log::debug!("Logger initialized at level {level}");

    Ok(())
}
