//! Field validation
//!
//! Rules applied to a single trimmed value:
//! - required fields must be non-empty
//! - email fields must look like `local@domain.tld`
//! - phone fields must reduce to a Norwegian 8-digit number, optionally
//!   prefixed with `+47`, once whitespace and hyphens are stripped; any
//!   stripped value of 8 or more characters is accepted as well

use regex::Regex;
use thiserror::Error;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^(\+47)?[0-9]{8}$";
const PHONE_MIN_LEN: usize = 8;

/// Field-level validation failures, worded for the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Dette feltet er påkrevd")]
    Required,

    #[error("Vennligst oppgi en gyldig e-postadresse")]
    InvalidEmail,

    #[error("Vennligst oppgi et gyldig telefonnummer")]
    InvalidPhone,
}

/// Semantic type of a form control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Checkbox,
    /// `select` with a closed set of options
    Choice,
}

impl FieldKind {
    /// Derive the kind from a tag name and its `type` attribute
    pub fn from_element(tag: &str, input_type: Option<&str>) -> Self {
        match (tag, input_type.map(str::to_ascii_lowercase).as_deref()) {
            ("select", _) => Self::Choice,
            ("input", Some("email")) => Self::Email,
            ("input", Some("tel")) => Self::Phone,
            ("input", Some("checkbox")) => Self::Checkbox,
            _ => Self::Text,
        }
    }
}

/// Outcome of validating one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationState {
    pub is_valid: bool,
    pub error_message: Option<String>,
}

impl FieldValidationState {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: None,
        }
    }

    pub fn invalid(error: ValidationError) -> Self {
        Self {
            is_valid: false,
            error_message: Some(error.to_string()),
        }
    }
}

impl From<Result<(), ValidationError>> for FieldValidationState {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::valid(),
            Err(e) => Self::invalid(e),
        }
    }
}

/// Compiled validation rules
#[derive(Debug, Clone)]
pub struct FieldValidator {
    email: Regex,
    phone: Regex,
}

impl FieldValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
        })
    }

    /// Validate a raw control value
    pub fn validate(&self, kind: FieldKind, required: bool, raw: &str) -> Result<(), ValidationError> {
        let value = raw.trim();

        if value.is_empty() {
            return if required {
                Err(ValidationError::Required)
            } else {
                Ok(())
            };
        }

        match kind {
            FieldKind::Email if !self.is_valid_email(value) => Err(ValidationError::InvalidEmail),
            FieldKind::Phone if !self.is_valid_phone(value) => Err(ValidationError::InvalidPhone),
            _ => Ok(()),
        }
    }

    pub fn is_valid_email(&self, value: &str) -> bool {
        self.email.is_match(value)
    }

    pub fn is_valid_phone(&self, value: &str) -> bool {
        let cleaned = strip_phone_separators(value);
        self.phone.is_match(&cleaned) || cleaned.chars().count() >= PHONE_MIN_LEN
    }
}

/// Remove whitespace and hyphens from a phone number
pub fn strip_phone_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}
