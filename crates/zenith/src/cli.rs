//! Command-line interface handling for the Zenith engine host.
//!
//! Options given here override the values loaded from the configuration file.

use crate::config::AppConfig;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional override for the number of ticks to run
    pub max_ticks: Option<u64>,
}

impl CliArgs {
    /// Parses the process arguments. Exits with a usage message on error.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            max_ticks: matches.get_one::<u64>("max-ticks").copied(),
        }
    }

    /// Writes the overrides into `config`.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json_format = true;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.engine.max_ticks = max_ticks;
        }
    }
}

fn command() -> Command {
    Command::new("Zenith Engine")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Headless host for the Zenith 2D engine event loop")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-ticks")
                .short('t')
                .long("max-ticks")
                .value_name("COUNT")
                .help("Stop after this many ticks (0 runs until quit)")
                .value_parser(clap::value_parser!(u64)),
        )
}
