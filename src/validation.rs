//! Mint Input Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! The widget maps any violation to a rejected mint before state changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Wallet,
    Name,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Wallet => "Wallet Address",
            Field::Name => "Name",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub field: Field,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

/// What the user typed into the form when pressing mint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MintInput {
    pub wallet: String,
    pub name: String,
}

impl MintInput {
    fn value(&self, field: Field) -> &str {
        match field {
            Field::Wallet => &self.wallet,
            Field::Name => &self.name,
        }
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &MintInput) -> Vec<ValidationViolation>;
}

/// Rejects an empty field. Whitespace counts as content.
pub struct RequiredField(pub Field);

impl ValidationRule for RequiredField {
    fn name(&self) -> &'static str {
        "required"
    }

    fn validate(&self, input: &MintInput) -> Vec<ValidationViolation> {
        if input.value(self.0).is_empty() {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                field: self.0,
                message: format!("{} is required", self.0.label()),
            }]
        } else {
            vec![]
        }
    }
}

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(RequiredField(Field::Wallet)),
                Box::new(RequiredField(Field::Name)),
            ],
        }
    }

    pub fn validate(&self, input: &MintInput) -> ValidationResult {
        ValidationResult {
            violations: self.rules.iter().flat_map(|r| r.validate(input)).collect(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
