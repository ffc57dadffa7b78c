//! Form validation, run before any auth or store call.
//!
//! Checks run in field order and stop at the first failure, so the message
//! always points at the topmost offending input.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ValidationError;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Trimmed `value`, or `Required` naming `label`.
pub fn required<'a>(label: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::required(label))
    } else {
        Ok(trimmed)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    match email_regex() {
        Some(re) => re.is_match(email),
        None => email.contains('@'),
    }
}

pub fn validate_email(email: &str) -> Result<&str, ValidationError> {
    let email = required("Email", email)?;
    if is_valid_email(email) {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Passwords are not trimmed; whitespace counts toward the length.
pub fn validate_password(password: &str, min_len: usize) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::required("Password"));
    }
    if password.chars().count() < min_len {
        return Err(ValidationError::PasswordTooShort { min_len });
    }
    Ok(())
}

/// Login form.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Validated copy with the email trimmed.
    pub fn validate(&self, min_len: usize) -> Result<Credentials, ValidationError> {
        let email = validate_email(&self.email)?;
        validate_password(&self.password, min_len)?;
        Ok(Credentials::new(email, &self.password))
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub student_level: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    /// Validated copy with text fields trimmed.
    pub fn validate(&self, min_len: usize) -> Result<Registration, ValidationError> {
        let full_name = required("Full name", &self.full_name)?;
        let email = validate_email(&self.email)?;
        let student_level = required("Student level", &self.student_level)?;
        validate_password(&self.password, min_len)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(Registration {
            full_name: full_name.to_string(),
            email: email.to_string(),
            student_level: student_level.to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        })
    }
}
