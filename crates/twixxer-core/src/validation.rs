//! Form types and their validation rules.
//!
//! Validation collects every problem per field instead of stopping at the
//! first one, so a form can report all of its errors at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const USERNAME_MIN_CHARS: usize = 2;
pub const USERNAME_MAX_CHARS: usize = 127;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const CHIRP_MAX_CHARS: usize = 280;
pub const ABOUT_MAX_CHARS: usize = 255;
pub const IMAGE_URL_MAX_CHARS: usize = 255;

/// Field name → error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a field, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Loose structural email check: one `@`, a local part, and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().count() > EMAIL_MAX_CHARS || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}

/// Only same-site absolute paths are allowed as post-login targets.
pub fn sanitize_redirect(target: Option<&str>) -> String {
    // Browsers drop tabs and newlines from `Location`, so `/\t/host` would
    // become `//host`.
    match target.map(str::trim) {
        Some(t)
            if t.starts_with('/')
                && !t.starts_with("//")
                && !t.contains('\\')
                && !t.chars().any(|c| c.is_ascii_control() || c.is_whitespace()) =>
        {
            t.to_string()
        }
        _ => "/".to_string(),
    }
}

fn empty_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Signup data that passed validation. The email is lower-cased.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(self) -> Result<ValidSignup, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = self.username.trim().to_string();
        let len = username.chars().count();
        if len < USERNAME_MIN_CHARS {
            errors.add("username", "Username must be at least 2 characters");
        } else if len > USERNAME_MAX_CHARS {
            errors.add("username", "Username cannot exceed 127 characters");
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.add(
                "username",
                "Username may only contain letters, digits, and underscores",
            );
        }

        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            errors.add("email", "Invalid email address");
        }

        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add("password", "Password must be at least 8 characters");
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords don't match");
        }

        errors.into_result(ValidSignup {
            username,
            email,
            password: self.password,
        })
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email_or_username: String,
    pub password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidLogin {
    pub login: String,
    pub password: String,
    pub redirect_to: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<ValidLogin, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let login = self.email_or_username.trim().to_string();
        if login.is_empty() {
            errors.add("email_or_username", "Email or username is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }

        errors.into_result(ValidLogin {
            login,
            password: self.password,
            redirect_to: sanitize_redirect(self.redirect_to.as_deref()),
        })
    }
}

// ---------------------------------------------------------------------------
// Resend verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ResendForm {
    pub email: String,
}

impl ResendForm {
    /// Returns the normalized email address.
    pub fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            errors.add("email", "Invalid email address");
        }
        errors.into_result(email)
    }
}

// ---------------------------------------------------------------------------
// Chirp
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChirpForm {
    pub content: String,
}

impl ChirpForm {
    /// Returns the content unchanged; whitespace-only content is rejected.
    pub fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.content.trim().is_empty() {
            errors.add("content", "Chirp content is required");
        } else if self.content.chars().count() > CHIRP_MAX_CHARS {
            errors.add("content", "Chirp cannot exceed 280 characters");
        }
        errors.into_result(self.content)
    }
}

// ---------------------------------------------------------------------------
// Profile edit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileEditForm {
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProfileEditForm {
    pub fn validate(self) -> Result<crate::models::ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let about = empty_to_none(self.about);
        if about
            .as_ref()
            .is_some_and(|a| a.chars().count() > ABOUT_MAX_CHARS)
        {
            errors.add("about", "About cannot exceed 255 characters");
        }

        let image_url = empty_to_none(self.image_url);
        if let Some(raw) = &image_url {
            if raw.chars().count() > IMAGE_URL_MAX_CHARS {
                errors.add("image_url", "URL cannot exceed 255 characters");
            }
            match url::Url::parse(raw) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => errors.add("image_url", "Please enter a valid URL"),
            }
        }

        errors.into_result(crate::models::ProfileUpdate { about, image_url })
    }
}
