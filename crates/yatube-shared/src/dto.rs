//! Form payloads - `application/x-www-form-urlencoded` request bodies.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Submitted post form. Missing fields deserialize as blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: String,
}

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Signup form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_passwords_match", skip_on_field_errors = false))]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,

    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Enter a username of 1 to 150 characters."),
        custom(function = "validate_username_chars")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password1: String,

    #[serde(default)]
    pub password2: String,
}

fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars").with_message(
            "Letters, digits and @/./+/-/_ only.".into(),
        ))
    }
}

fn validate_passwords_match(form: &SignupForm) -> Result<(), ValidationError> {
    if form.password1 == form.password2 {
        Ok(())
    } else {
        Err(ValidationError::new("password_mismatch")
            .with_message("The two password fields didn't match.".into()))
    }
}
