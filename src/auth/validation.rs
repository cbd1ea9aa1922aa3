use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    auth::dto::{LoginRequest, SignupRequest},
    error::ValidationError,
};

const SIGNUP_FIELDS: &str = "Provide email, password and name";
const LOGIN_FIELDS: &str = "Provide email and password.";
const MIN_PASSWORD_CHARS: usize = 6;

/// Signup fields that passed validation, borrowed from the request as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignupCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

pub fn validate_signup(req: &SignupRequest) -> Result<SignupCredentials<'_>, ValidationError> {
    let (Some(email), Some(password), Some(name)) =
        (present(&req.email), present(&req.password), present(&req.name))
    else {
        return Err(ValidationError::MissingField(SIGNUP_FIELDS));
    };

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_strong_password(password) {
        return Err(ValidationError::WeakPassword);
    }

    Ok(SignupCredentials {
        email,
        password,
        name,
    })
}

pub fn require_login(req: &LoginRequest) -> Result<(&str, &str), ValidationError> {
    match (present(&req.email), present(&req.password)) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(ValidationError::MissingField(LOGIN_FIELDS)),
    }
}
