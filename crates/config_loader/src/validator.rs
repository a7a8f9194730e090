//! Config validation
//!
//! Rules:
//! - propertyID is required, a non-empty string
//! - edgeDomain is optional; when present it must be a valid domain string

use contracts::{ConfigValidator, ContractError};
use serde_json::Value;

/// Default validators applied to every `configure` call
pub fn config_validators() -> Vec<ConfigValidator> {
    vec![
        ConfigValidator::new("propertyID", required_string),
        ConfigValidator::new("edgeDomain", optional_domain),
    ]
}

/// Required, non-empty string
pub fn required_string(key: &str, value: Option<&Value>) -> Result<(), ContractError> {
    match value {
        None | Some(Value::Null) => Err(ContractError::config_validation(
            key,
            format!("{key} is required"),
        )),
        Some(Value::String(s)) if s.is_empty() => Err(ContractError::config_validation(
            key,
            format!("{key} cannot be empty"),
        )),
        Some(Value::String(_)) => Ok(()),
        Some(other) => Err(ContractError::config_validation(
            key,
            format!("{key} must be a string, got {other}"),
        )),
    }
}

/// Optional domain: letters, digits, '-' and '.', case-insensitive
pub fn optional_domain(key: &str, value: Option<&Value>) -> Result<(), ContractError> {
    let domain = match value {
        None => return Ok(()),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(ContractError::config_validation(
                key,
                format!("{key} must be a string, got {other}"),
            ))
        }
    };

    if is_domain(domain) {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            key,
            format!("'{domain}' is not a valid domain"),
        ))
    }
}

fn is_domain(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}
