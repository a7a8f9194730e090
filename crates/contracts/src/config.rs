//! Config - validated configure options
//!
//! Built from the options passed to `configure`, then handed to the
//! component initializer once every registered validator has passed.

use serde_json::{Map, Value};

use crate::ContractError;

/// Validation rule for a single option key
///
/// Receives the key and its value (`None` when absent).
pub type FieldRule = fn(key: &str, value: Option<&Value>) -> Result<(), ContractError>;

/// Named validation rule
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    /// Option key the rule applies to
    pub field: String,
    /// Rule implementation
    pub rule: FieldRule,
}

impl ConfigValidator {
    /// Create a validator for `field`
    pub fn new(field: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }

    /// Run the rule against the config values
    pub fn check(&self, values: &Map<String, Value>) -> Result<(), ContractError> {
        (self.rule)(&self.field, values.get(&self.field))
    }
}

/// Configure options plus registered validators
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: Map<String, Value>,
    validators: Vec<ConfigValidator>,
}

impl Config {
    /// Create a config from raw option values
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            validators: Vec::new(),
        }
    }

    /// Register additional validators; they run in registration order
    pub fn add_validators(&mut self, validators: impl IntoIterator<Item = ConfigValidator>) {
        self.validators.extend(validators);
    }

    /// Registered validators
    pub fn validators(&self) -> &[ConfigValidator] {
        &self.validators
    }

    /// Run every validator, returning the first failure
    pub fn validate(&self) -> Result<(), ContractError> {
        for validator in &self.validators {
            validator.check(&self.values)?;
        }
        Ok(())
    }

    /// Raw option values
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Property identifier (`propertyID`)
    pub fn property_id(&self) -> Option<&str> {
        self.get_str("propertyID")
    }

    /// Edge domain override (`edgeDomain`)
    pub fn edge_domain(&self) -> Option<&str> {
        self.get_str("edgeDomain")
    }
}
