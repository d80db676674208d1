//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use vacances_core::Zone;

/// vacances - French school holidays at a glance
#[derive(Debug, Parser)]
#[command(name = "vacances")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "VACANCES_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and show the current or next holiday period
    ///
    /// Without --location or --zone, every configured entry is shown.
    Status(StatusArgs),

    /// Keep configured entries refreshed until stopped
    ///
    /// SIGHUP re-reads the configuration file, SIGTERM/SIGINT stop.
    Run {
        /// Log as JSON lines
        #[arg(long)]
        log_json: bool,
    },

    /// List the known zones
    Zones,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `vacances status`.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Academy/location name, e.g. "Paris"
    #[arg(long, group = "target")]
    pub location: Option<String>,

    /// Zone label, e.g. "Zone C"
    #[arg(long, group = "target")]
    pub zone: Option<Zone>,

    /// Do not verify the API's TLS certificate
    #[arg(long)]
    pub insecure: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_by_zone() {
        let cli = Cli::try_parse_from(["vacances", "status", "--zone", "zone c", "--json"]).unwrap();
        match cli.command {
            Command::Status(args) => {
                assert_eq!(args.zone, Some(Zone::C));
                assert!(args.json);
                assert!(!args.insecure);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn location_and_zone_conflict() {
        let result =
            Cli::try_parse_from(["vacances", "status", "--location", "Paris", "--zone", "Zone A"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_zone_is_rejected() {
        assert!(Cli::try_parse_from(["vacances", "status", "--zone", "Zone Z"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vacances", "run", "--log-json", "-v", "-c", "/tmp/v.toml"])
            .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/v.toml")));
        assert!(matches!(cli.command, Command::Run { log_json: true }));
    }
}
