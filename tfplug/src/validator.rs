//! Built-in attribute validators
//!
//! Validators only look at known values; null and unknown configuration
//! values pass through untouched and are left to the required/optional
//! checks in [`crate::plan::validate_config`].

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::Diagnostic;

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringLengthValidator {
    pub fn create(min: Option<usize>, max: Option<usize>) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        format!("string length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        if let Some(s) = request.config_value.value.as_str() {
            let len = s.chars().count();
            if let Some(min) = self.min {
                if len < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have minimum length of {}", request.path, min),
                            format!("Got length {}", len),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if len > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have maximum length of {}", request.path, max),
                            format!("Got length {}", len),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl StringPatternValidator {
    /// Compiles the pattern up front; a bad pattern surfaces here
    pub fn create(pattern: &str, description: &str) -> Result<Box<dyn Validator>, regex::Error> {
        Ok(Box::new(Self {
            pattern: regex::Regex::new(pattern)?,
            description: description.to_string(),
        }))
    }
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        if let Some(s) = request.config_value.value.as_str() {
            if !self.pattern.is_match(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must match {}", request.path, self.description),
                        format!("Value '{}' does not match pattern", s),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Restricts a string to a fixed set of values
pub struct OneOfValidator {
    pub values: Vec<String>,
}

impl OneOfValidator {
    pub fn create(values: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }
}

impl Validator for OneOfValidator {
    fn description(&self) -> String {
        format!("one of {}", self.values.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        if let Some(s) = request.config_value.value.as_str() {
            if !self.values.iter().any(|v| v == s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be one of: {}", request.path, self.values.join(", ")),
                        format!("Got '{}'", s),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRangeValidator {
    pub fn create(min: Option<f64>, max: Option<f64>) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        format!("number between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        if let Some(n) = request.config_value.value.as_number() {
            if let Some(min) = self.min {
                if n < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must be at least {}", request.path, min),
                            format!("Got {}", n),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must be at most {}", request.path, max),
                            format!("Got {}", n),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl ListLengthValidator {
    pub fn create(min: Option<usize>, max: Option<usize>) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for ListLengthValidator {
    fn description(&self) -> String {
        format!("list length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        if let Some(items) = request.config_value.value.as_list() {
            if let Some(min) = self.min {
                if items.len() < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have at least {} items", request.path, min),
                            format!("Got {} items", items.len()),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if items.len() > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have at most {} items", request.path, max),
                            format!("Got {} items", items.len()),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}
