use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Sets up the application logger with console output.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Dependencies are kept at
/// `warn` so the decision loop stays readable.
///
/// # Errors
/// * If a logger was already installed
pub fn setup_logger() -> Result<()> {
    Dispatch::new()
        .level(LevelFilter::Warn)
        .level_for(env!("CARGO_CRATE_NAME"), level_from_env())
        // Configure logging to console
        .chain(std::io::stdout())
        // Format log messages with time and log level
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ));
        })
        .apply()?;
    Ok(())
}

/// Level requested through `RUST_LOG`, `info` when unset or unparsable
fn level_from_env() -> LevelFilter {
    parse_level(std::env::var("RUST_LOG").ok().as_deref())
}

fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("TRACE")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Info);
    }
}
