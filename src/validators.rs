/// Input validators for user and chirp payloads

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
pub const MAX_CHIRP_LENGTH: usize = 140;
const CENSORED: &str = "****";
const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Rejects empty passwords; strength rules are left to the hasher's limits.
pub fn is_present_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }
    Ok(())
}

/// Enforces the chirp length limit and censors profane words.
///
/// The limit counts UTF-8 bytes, not characters.
///
/// Words are space-delimited and matched case-insensitively; a word with
/// punctuation attached ("Sharbert!") is left alone.
pub fn clean_chirp_body(body: &str) -> Result<String, ValidationError> {
    if body.len() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("chirp", MAX_CHIRP_LENGTH));
    }

    let cleaned = body
        .split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    Ok(cleaned)
}
