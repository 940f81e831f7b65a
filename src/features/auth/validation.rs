//! Client-side input guards. These only check shape; the account API stays
//! authoritative for everything else.

use super::error::{AuthFailure, INVALID_EMAIL, INVALID_OTP, MISSING_PASSWORD};
use regex::Regex;

pub const OTP_LENGTH: usize = 4;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Exactly four ASCII decimal digits.
pub fn valid_otp(otp: &str) -> bool {
    otp.len() == OTP_LENGTH && otp.bytes().all(|b| b.is_ascii_digit())
}

/// # Errors
/// Returns `AuthFailure::Validation` when the code is not four decimal digits.
pub fn check_otp(otp: &str) -> Result<(), AuthFailure> {
    if valid_otp(otp) {
        Ok(())
    } else {
        Err(AuthFailure::Validation(INVALID_OTP.to_string()))
    }
}

/// # Errors
/// Returns `AuthFailure::Validation` for a malformed email or an empty password.
pub fn check_credentials(email: &str, password: &str) -> Result<(), AuthFailure> {
    if !valid_email(email.trim()) {
        return Err(AuthFailure::Validation(INVALID_EMAIL.to_string()));
    }
    if password.is_empty() {
        return Err(AuthFailure::Validation(MISSING_PASSWORD.to_string()));
    }
    Ok(())
}
