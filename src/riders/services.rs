use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::AppError,
    riders::{dto::RiderRequest, repo_types::NewRider},
};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn present(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Checks required fields and email syntax, normalising the email to
/// lowercase. Every missing field is listed, not only the first.
pub fn validate_rider(req: RiderRequest) -> Result<NewRider, AppError> {
    let name = present(req.name);
    let email = present(req.email).map(|e| e.to_lowercase());
    let phone = present(req.phone);

    let mut missing = Vec::new();
    if name.is_none() {
        missing.push("name");
    }
    if email.is_none() {
        missing.push("email");
    }
    if phone.is_none() {
        missing.push("phone");
    }
    let (Some(name), Some(email), Some(phone)) = (name, email, phone) else {
        return Err(AppError::validation("Missing required fields", missing));
    };

    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email", vec!["email"]));
    }

    Ok(NewRider {
        name,
        email,
        phone,
        created_at: None,
    })
}
