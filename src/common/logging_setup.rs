use crate::config_loader::MasterConfig;
use env_logger::Builder;
use log::LevelFilter;

/// Initialize the process-wide logger. Precedence: `--debug` flag, then the
/// config's `application.log_level`, then info. The config is optional so
/// logging can come up even when config loading itself failed.
pub fn initialize_logging(config: Option<&MasterConfig>, cli_matches: &clap::ArgMatches) {
    let level = if cli_matches.get_flag("debug") {
        LevelFilter::Debug
    } else {
        config
            .and_then(|c| c.app_settings.log_level.as_deref())
            .map(parse_level)
            .unwrap_or(LevelFilter::Info)
    };

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.try_init().unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Logging might not work as expected.", e);
    });
}

fn parse_level(s: &str) -> LevelFilter {
    match s.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        other => {
            eprintln!("Unrecognized log level '{}', defaulting to info.", other);
            LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels_case_insensitively() {
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("Trace"), LevelFilter::Trace);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("loud"), LevelFilter::Info);
        assert_eq!(parse_level(""), LevelFilter::Info);
    }
}
