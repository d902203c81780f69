use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use thiserror::Error;

/// Hex-encoded length of a CSRF token: 32 random bytes.
pub const CSRF_TOKEN_LEN: usize = 64;

const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-()]{6,19}$").expect("valid regex"));
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'-]{0,79}$").expect("valid regex"));
static ALPHANUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid regex"));

/// Input categories with a fixed validation pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Email,
    Phone,
    Name,
    Alphanumeric,
    /// Unrecognized kinds pass through as valid. Permissive by contract:
    /// form fields without a registered pattern are not rejected here.
    Other(String),
}

/// Validate a field against the fixed pattern for its kind.
pub fn validate_input(value: &str, kind: &InputKind) -> bool {
    match kind {
        InputKind::Email => EMAIL_RE.is_match(value),
        InputKind::Phone => PHONE_RE.is_match(value),
        InputKind::Name => NAME_RE.is_match(value),
        InputKind::Alphanumeric => ALPHANUMERIC_RE.is_match(value),
        InputKind::Other(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyViolation {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain a digit")]
    MissingDigit,
}

/// Per-rule breakdown of a candidate password.
///
/// `has_special` is reported for UI strength meters but is not part of
/// the enforced policy — see [`validate_password`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReport {
    pub length_ok: bool,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_digit: bool,
    pub has_special: bool,
}

pub fn password_report(password: &str) -> PasswordReport {
    PasswordReport {
        length_ok: password.chars().count() >= MIN_PASSWORD_LEN,
        has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
        has_lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
        has_digit: password.chars().any(|c| c.is_ascii_digit()),
        has_special: password.chars().any(|c| !c.is_ascii_alphanumeric()),
    }
}

/// Enforced policy: minimum length, one uppercase, one lowercase, one
/// digit. A special character is measured but intentionally not required.
pub fn validate_password(password: &str) -> Result<(), PasswordPolicyViolation> {
    let report = password_report(password);
    if !report.length_ok {
        return Err(PasswordPolicyViolation::TooShort { min: MIN_PASSWORD_LEN });
    }
    if !report.has_uppercase {
        return Err(PasswordPolicyViolation::MissingUppercase);
    }
    if !report.has_lowercase {
        return Err(PasswordPolicyViolation::MissingLowercase);
    }
    if !report.has_digit {
        return Err(PasswordPolicyViolation::MissingDigit);
    }
    Ok(())
}

/// Generate a fresh CSRF token: 32 bytes from the OS random source,
/// hex-encoded to exactly [`CSRF_TOKEN_LEN`] characters.
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A token validates only when both strings carry the expected full
/// length and match over their entire contents; a truncated prefix of a
/// valid token never passes.
pub fn validate_csrf_token(submitted: &str, issued: &str) -> bool {
    submitted.len() == CSRF_TOKEN_LEN && issued.len() == CSRF_TOKEN_LEN && submitted == issued
}

/// One active token per form id. In-memory only: tokens do not survive a
/// reload, which forces a fresh issue per page view.
#[derive(Debug, Default)]
pub struct CsrfRegistry {
    tokens: Mutex<HashMap<String, String>>,
}

impl CsrfRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for the form, replacing any previously issued one.
    pub fn issue(&self, form_id: &str) -> String {
        let token = generate_csrf_token();
        self.tokens
            .lock()
            .unwrap()
            .insert(form_id.to_string(), token.clone());
        token
    }

    /// Verify a submission and consume the token on success.
    pub fn verify(&self, form_id: &str, submitted: &str) -> bool {
        let mut tokens = self.tokens.lock().unwrap();
        let valid = tokens
            .get(form_id)
            .map(|issued| validate_csrf_token(submitted, issued))
            .unwrap_or(false);
        if valid {
            tokens.remove(form_id);
        }
        valid
    }
}
