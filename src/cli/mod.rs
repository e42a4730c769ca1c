//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// Hourglass - hourly table export to S3 with warehouse reload
#[derive(Parser, Debug)]
#[command(name = "hourglass")]
#[command(version, about, long_about = None)]
#[command(author = "Hourglass Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hourglass.toml", env = "HOURGLASS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HOURGLASS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export, reload and advance every due window
    Run(commands::run::RunArgs),

    /// Print the latest hour reconstructed from the bucket
    Locate(commands::locate::LocateArgs),

    /// Show persisted markers and due windows
    Status(commands::status::StatusArgs),

    /// Insert a table's initial marker
    Seed(commands::seed::SeedArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["hourglass", "run"]);
        assert_eq!(cli.config, "hourglass.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_run_options() {
        let cli = Cli::parse_from([
            "hourglass",
            "run",
            "--table",
            "events",
            "-t",
            "orders",
            "--dry-run",
            "--max-windows",
            "24",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.tables, vec!["events", "orders"]);
                assert!(args.dry_run);
                assert_eq!(args.max_windows, Some(24));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_zero_max_windows() {
        assert!(Cli::try_parse_from(["hourglass", "run", "--max-windows", "0"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["hourglass", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["hourglass", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_locate_requires_table() {
        assert!(Cli::try_parse_from(["hourglass", "locate"]).is_err());
        let cli = Cli::parse_from(["hourglass", "locate", "--table", "events"]);
        assert!(matches!(cli.command, Commands::Locate(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["hourglass", "status", "--json"]);
        match cli.command {
            Commands::Status(args) => assert!(args.json),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["hourglass", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["hourglass", "init", "--output", "x.toml", "--force"]);
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.output, "x.toml");
                assert!(args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
