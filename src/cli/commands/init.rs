//! Init command implementation
//!
//! Writes a starter configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "hourglass.toml")]
    pub output: String,

    /// Include every optional setting with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Hourglass configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your bucket, role and tables", self.output);
                println!("  2. Set HOURGLASS_SOURCE_URL and HOURGLASS_WAREHOUSE_URL (or use a .env file)");
                println!("  3. Validate configuration: hourglass validate-config");
                println!("  4. Seed each table: hourglass seed --table <name> --start <RFC3339>");
                println!("  5. Run: hourglass run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Hourglass Configuration File
# Hourly table export to S3 and warehouse reload

[application]
log_level = "info"

[source]
connection_string = "${HOURGLASS_SOURCE_URL}"

[warehouse]
connection_string = "${HOURGLASS_WAREHOUSE_URL}"

[storage]
bucket = "my-archive-bucket"
region = "us-east-1"
iam_role = "arn:aws:iam::123456789012:role/warehouse-loader"

[[tables]]
name = "events"
time_column = "created_at"
columns = ["id", "kind", "payload", "created_at"]
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Hourglass Configuration File
# Hourly table export to S3 and warehouse reload
#
# Values of the form ${VAR} are read from the environment.
# Any setting can also be overridden with HOURGLASS_<SECTION>_<KEY>.

[application]
# trace, debug, info, warn, error
log_level = "info"
# Read sources and render files, but write nothing
dry_run = false

[source]
# Database the hourly windows are read from
connection_string = "${HOURGLASS_SOURCE_URL}"
max_connections = 4
connection_timeout_seconds = 30
statement_timeout_seconds = 300
# disable, prefer, require
ssl_mode = "prefer"

[warehouse]
# Redshift (or any PostgreSQL-protocol warehouse) the files are loaded into
connection_string = "${HOURGLASS_WAREHOUSE_URL}"
max_connections = 4
connection_timeout_seconds = 30
statement_timeout_seconds = 900
ssl_mode = "require"
# One row per (bucket, table_name) holding the next hour to export
markers_table = "import_markers"

[storage]
bucket = "my-archive-bucket"
region = "us-east-1"
# S3-compatible endpoint for local testing, e.g. http://localhost:9000
# endpoint = "http://localhost:9000"
# allow_http = true
# Role the warehouse assumes to read the bucket during COPY
iam_role = "arn:aws:iam::123456789012:role/warehouse-loader"
request_timeout_seconds = 60
# Compare the stored object size with the uploaded body
verify_upload = true

[state]
# Rebuild a missing marker from the newest object in the bucket
bootstrap_from_storage = false
# Minutes after an hour closes before it is exported
settle_minutes = 5

[import]
# half_open deletes [from, to); closed deletes [from, to]
delete_bounds = "half_open"

[[tables]]
name = "events"
time_column = "created_at"
columns = ["id", "kind", "payload", "created_at"]
# destination_table = "analytics.events"
# Windows processed per run; raise to catch up after an outage
max_windows = 1

[logging]
local_enabled = true
local_path = "/var/log/hourglass"
# daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HourglassConfig;
    use tempfile::TempDir;

    fn parse(template: &str) -> HourglassConfig {
        let filled = template
            .replace("${HOURGLASS_SOURCE_URL}", "postgresql://u:p@source:5432/app")
            .replace("${HOURGLASS_WAREHOUSE_URL}", "postgresql://u:p@dw:5439/dw");
        toml::from_str(&filled).unwrap()
    }

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "hourglass.toml".to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.output, "hourglass.toml");
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config() {
        let config = parse(&InitArgs::generate_minimal_config());
        assert!(config.validate().is_ok());
        assert_eq!(config.tables.len(), 1);
    }

    #[test]
    fn test_generate_config_with_examples() {
        let config = parse(&InitArgs::generate_config_with_examples());
        assert!(config.validate().is_ok());
        assert_eq!(config.warehouse.markers_table, "import_markers");
        assert_eq!(config.state.settle_minutes, 5);
    }

    #[tokio::test]
    async fn test_existing_file_needs_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("hourglass.toml");
        fs::write(&output, "# keep me").unwrap();

        let mut args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# keep me");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[[tables]]"));
    }
}
