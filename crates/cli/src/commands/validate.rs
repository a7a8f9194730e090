//! `validate` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::Config;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

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
    summary: Option<OptionsSummary>,
}

#[derive(Serialize)]
struct OptionsSummary {
    property_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    edge_domain: Option<String>,
    keys: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configure options");

    let result = validate_options(&args.config);

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
        Err(CliError::config_validation(result.error.unwrap_or_default()).into())
    }
}

fn validate_options(path: &Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", path.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_validated(path) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(OptionsSummary {
                    property_id: config.property_id().unwrap_or_default().to_string(),
                    edge_domain: config.edge_domain().map(str::to_string),
                    keys: config.values().keys().cloned().collect(),
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

/// Non-fatal issues
fn collect_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(log) = config.get("log") {
        if !log.is_boolean() {
            warnings.push(format!("log should be a boolean, got {log}"));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Options are valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  propertyID: {}", summary.property_id);
            if let Some(ref edge_domain) = summary.edge_domain {
                println!("  edgeDomain: {}", edge_domain);
            }
            println!("  Keys: {}", summary.keys.join(", "));
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Options are invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
