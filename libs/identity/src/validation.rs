//! Account input checks run before anything reaches the provider

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum password length accepted by the identity provider
pub const MIN_PASSWORD_LEN: usize = 6;
/// bcrypt on the provider side ignores bytes past 72
pub const MAX_PASSWORD_LEN: usize = 72;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be at most {max} characters long")]
    TooLong { field: &'static str, max: usize },

    #[error("Password must be at least {} characters long", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("Invalid email format")]
    MalformedEmail,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    match email {
        "" => Err(ValidationError::Missing("Email")),
        e if e.len() > MAX_EMAIL_LEN => Err(ValidationError::TooLong {
            field: "Email",
            max: MAX_EMAIL_LEN,
        }),
        e if !email_pattern().is_match(e) => Err(ValidationError::MalformedEmail),
        _ => Ok(()),
    }
}

/// Length limits only; strength rules belong to the provider
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    match password.chars().count() {
        0 => Err(ValidationError::Missing("Password")),
        n if n < MIN_PASSWORD_LEN => Err(ValidationError::PasswordTooShort),
        _ if password.len() > MAX_PASSWORD_LEN => Err(ValidationError::TooLong {
            field: "Password",
            max: MAX_PASSWORD_LEN,
        }),
        _ => Ok(()),
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    match name.trim().chars().count() {
        0 => Err(ValidationError::Missing("Name")),
        n if n > MAX_NAME_LEN => Err(ValidationError::TooLong {
            field: "Name",
            max: MAX_NAME_LEN,
        }),
        _ => Ok(()),
    }
}
