//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{SinkType, SourceKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    source_kind: String,
    batch_size: usize,
    stream_count: usize,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(plan) => {
            let warnings = collect_warnings(&plan);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", plan.version),
                    source_kind: format!("{:?}", plan.source.kind),
                    batch_size: plan.source.batch_size,
                    stream_count: plan.source.streams.len(),
                    sink_count: plan.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(plan: &contracts::DispatchPlan) -> Vec<String> {
    let mut warnings = Vec::new();

    // Check for empty sinks
    if plan.sinks.is_empty() {
        warnings.push("No sinks configured - records will be dropped".to_string());
    }

    // Network sinks need an address at creation time
    for sink in &plan.sinks {
        if sink.sink_type == SinkType::Network && !sink.params.contains_key("addr") {
            warnings.push(format!(
                "Network sink '{}' has no 'addr' param - sink creation will fail",
                sink.name
            ));
        }
    }

    // Unpaced replay floods the queue as fast as the file reads
    if plan.source.kind == SourceKind::Replay && plan.source.speed == 0.0 {
        warnings.push("source.speed is 0 - replaying as fast as possible".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Source: {}", summary.source_kind);
            println!("  Batch size: {}", summary.batch_size);
            println!("  Streams: {}", summary.stream_count);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(path: &std::path::Path) -> ValidateArgs {
        ValidateArgs {
            config: path.to_path_buf(),
            json: false,
        }
    }

    #[test]
    fn test_validate_missing_file() {
        let args = args_for(std::path::Path::new("/nonexistent/config.toml"));
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_validate_good_config_with_warning() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[source]
kind = "synthetic"
streams = ["alpha"]

[[sinks]]
name = "net"
sink_type = "network"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let result = validate_config(&args_for(file.path()));
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("no 'addr' param")));
    }

    #[test]
    fn test_validate_bad_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[source]
kind = "synthetic"
streams = []

[[sinks]]
name = "log"
sink_type = "log"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let result = validate_config(&args_for(file.path()));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("at least one stream"));
    }
}
