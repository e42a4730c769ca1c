//! Validate config command implementation

use crate::config::load_config;
use crate::config::redact_credentials;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates, so a loaded file is a valid one.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(e.exit_code());
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Source: {}",
            redact_credentials(config.source.connection_string.expose_secret().as_ref())
        );
        println!(
            "  Warehouse: {}",
            redact_credentials(
                config
                    .warehouse
                    .connection
                    .connection_string
                    .expose_secret()
                    .as_ref()
            )
        );
        println!("  Marker Table: {}", config.warehouse.markers_table);
        println!("  Bucket: {} ({})", config.storage.bucket, config.storage.region);
        if let Some(endpoint) = &config.storage.endpoint {
            println!("  Endpoint: {endpoint}");
        }
        println!("  Delete Bounds: {}", config.import.delete_bounds);
        println!("  Settle Minutes: {}", config.state.settle_minutes);
        println!(
            "  Bootstrap From Storage: {}",
            config.state.bootstrap_from_storage
        );
        println!("  Tables:");
        for table in &config.tables {
            println!(
                "    - {} -> {} ({} columns, up to {} windows/run)",
                table.name,
                table.destination(),
                table.columns.len(),
                table.max_windows
            );
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}
            .execute("/nonexistent/hourglass.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[application]\nlog_level = \"loud\"").unwrap();
        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
