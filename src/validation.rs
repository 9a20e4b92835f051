//! # Request validators
//!
//! Structural checks for inbound payloads, expressed with `validator`
//! derives. Every check reports all violated fields at once, each with a
//! machine-readable code and a human-readable reason.
//!
//! Raw requests keep every field optional so a missing field is reported as
//! `required` instead of failing JSON deserialization without attribution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::db::schema::{DecimalSpec, SCORE, TEMPO};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub reason: String,
}

/// One or more field-level violations, ordered by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", summarize(.errors))]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationFailure {
    pub fn single(field: &str, code: &str, reason: &str) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                code: code.into(),
                reason: reason.into(),
            }],
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut out: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldError {
                    field: field.to_string(),
                    code: err.code.to_string(),
                    reason: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_reason(&err.code)),
                })
            })
            .collect();
        out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        Self { errors: out }
    }
}

fn default_reason(code: &str) -> String {
    match code {
        "required" => "is required".into(),
        "email" => "must be a valid email address".into(),
        "length" => "has an invalid length".into(),
        "range" => "is out of range".into(),
        other => format!("failed {other} check"),
    }
}

/// Run a `Validate` impl and convert its errors.
pub fn check<T: Validate>(value: &T) -> Result<(), ValidationFailure> {
    value.validate().map_err(ValidationFailure::from)
}

// ============================================================================
// Email
// ============================================================================

/// Address syntax per `validator`, plus a dotted domain whose last label is
/// at least two letters. Rejects `ana@localhost` and `a@[127.0.0.1]`.
pub fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    if validator::validate_email(value) && has_dotted_domain(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("must be a valid email address".into());
    Err(err)
}

fn has_dotted_domain(value: &str) -> bool {
    let Some((_, domain)) = value.rsplit_once('@') else {
        return false;
    };
    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    !rest.is_empty()
        && rest.iter().all(|l| !l.is_empty())
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

// ============================================================================
// Decimal columns
// ============================================================================

fn fits(spec: DecimalSpec, value: &Decimal) -> Result<(), ValidationError> {
    spec.fit(*value).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("decimal_range");
        err.message = Some(e.to_string().into());
        err.add_param("max".into(), &spec.max_abs().to_string());
        err
    })
}

/// NUMERIC(3, 2): mood score, energy level, valence, energy.
pub fn validate_score(value: &Decimal) -> Result<(), ValidationError> {
    fits(SCORE, value)
}

/// NUMERIC(6, 2): tempo.
pub fn validate_tempo(value: &Decimal) -> Result<(), ValidationError> {
    fits(TEMPO, value)
}

// ============================================================================
// Register
// ============================================================================

/// POST body for registration, as received.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, custom = "validate_email_address")]
    pub email: Option<String>,

    #[validate(
        required,
        length(min = 3, max = 50, message = "must be between 3 and 50 characters")
    )]
    pub username: Option<String>,

    #[validate(required, length(min = 6, message = "must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Registration payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPayload {
    pub email: String,
    pub username: String,
    pub password: String,
}

pub fn validate_register(req: RegisterRequest) -> Result<RegisterPayload, ValidationFailure> {
    check(&req)?;
    Ok(RegisterPayload {
        email: present(req.email, "email")?,
        username: present(req.username, "username")?,
        password: present(req.password, "password")?,
    })
}

// ============================================================================
// Login
// ============================================================================

/// POST body for login. The password only has to be present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, custom = "validate_email_address")]
    pub email: Option<String>,

    #[validate(required)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub fn validate_login(req: LoginRequest) -> Result<LoginPayload, ValidationFailure> {
    check(&req)?;
    Ok(LoginPayload {
        email: present(req.email, "email")?,
        password: present(req.password, "password")?,
    })
}

fn present(value: Option<String>, field: &str) -> Result<String, ValidationFailure> {
    value.ok_or_else(|| ValidationFailure::single(field, "required", "is required"))
}
