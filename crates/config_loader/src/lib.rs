//! # Config Loader
//!
//! Configure-options handling.
//!
//! Responsibilities:
//! - Turn raw `configure` options into a `Config`
//! - Provide the default validators
//! - Read the log override from the location search string
//! - Load options from TOML/JSON files (harness use)
//!
//! # Example
//!
//! ```
//! use config_loader::{config_validators, create_config};
//! use serde_json::json;
//!
//! let mut config = create_config(json!({ "propertyID": "p1" })).unwrap();
//! config.add_validators(config_validators());
//! config.validate().unwrap();
//! ```

mod parser;
mod query;
mod validator;

pub use contracts::Config;
pub use parser::ConfigFormat;
pub use query::{log_override, parse_query_string, string_to_boolean, LOG_QUERY_PARAM};
pub use validator::{config_validators, optional_domain, required_string};

use contracts::ContractError;
use serde_json::Value;
use std::path::Path;

/// Build a `Config` from `configure` options
///
/// `null` is treated as an empty object; any other non-object is rejected.
pub fn create_config(options: Value) -> Result<Config, ContractError> {
    Ok(Config::new(parser::into_object(options)?))
}

/// Options file loader
///
/// Provides static methods to load configure options from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load options from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    pub fn load_from_path(path: &Path) -> Result<Value, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load options from string
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Value, ContractError> {
        let value = parser::parse(content, format)?;
        parser::into_object(value).map(Value::Object)
    }

    /// Load options and run the default validators
    ///
    /// # Errors
    /// - Any load failure
    /// - Validation failure
    pub fn load_validated(path: &Path) -> Result<Config, ContractError> {
        let mut config = create_config(Self::load_from_path(path)?)?;
        config.add_validators(config_validators());
        config.validate()?;
        Ok(config)
    }

    /// Serialize options to a pretty JSON string
    pub fn to_json(options: &Value) -> Result<String, ContractError> {
        serde_json::to_string_pretty(options)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer format from file extension
    pub fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_create_config_from_object() {
        let config = create_config(json!({ "propertyID": "p1" })).unwrap();
        assert_eq!(config.property_id(), Some("p1"));
        assert!(config.validators().is_empty());
    }

    #[test]
    fn test_create_config_from_null() {
        let config = create_config(Value::Null).unwrap();
        assert!(config.values().is_empty());
    }

    #[test]
    fn test_create_config_rejects_array() {
        assert!(create_config(json!([1, 2])).is_err());
    }

    #[test]
    fn test_load_validated_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "propertyID = \"p1\"\nedgeDomain = \"edge.example.com\"").unwrap();

        let config = ConfigLoader::load_validated(file.path()).unwrap();
        assert_eq!(config.property_id(), Some("p1"));
    }

    #[test]
    fn test_load_validated_runs_validators() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{ "edgeDomain": "edge.example.com" }}"#).unwrap();

        let err = ConfigLoader::load_validated(file.path()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("propertyID"), "got: {err}");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported"), "got: {err}");
    }
}
