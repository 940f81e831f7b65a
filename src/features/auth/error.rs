use crate::app_lib::AppError;
use thiserror::Error;

pub const SIGN_IN_FAILED: &str = "Sign in failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const OTP_VERIFICATION_FAILED: &str = "OTP verification failed";
pub const SESSION_EXPIRED: &str = "Session expired, please sign in again";
pub const NO_REFRESH_TOKEN: &str = "No refresh token found";
pub const LOGOUT_FAILED: &str = "Logout failed";
pub const PROFILE_FETCH_FAILED: &str = "Failed to fetch profile";
pub const INVALID_OTP: &str = "Enter a valid 4-digit code";
pub const MISSING_ACCOUNT_ID: &str = "Missing accountId. Please register again";
pub const INVALID_EMAIL: &str = "Enter a valid email address";
pub const MISSING_PASSWORD: &str = "Enter your password";

/// Reason an account operation did not complete. The message is what the user sees.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),
    /// The account API rejected the request.
    #[error("{0}")]
    Rejected(String),
    /// The refresh token is missing or no longer accepted.
    #[error("{0}")]
    SessionExpired(String),
    /// The account API could not be reached or answered garbage.
    #[error("{0}")]
    Transport(String),
}

impl AuthFailure {
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            AuthFailure::Validation(reason)
            | AuthFailure::Rejected(reason)
            | AuthFailure::SessionExpired(reason)
            | AuthFailure::Transport(reason) => reason,
        }
    }

    /// Maps a transport error, preferring the server's reason over `fallback`.
    pub(crate) fn from_app_error(err: &AppError, fallback: &str) -> Self {
        match err {
            AppError::Http { .. } => {
                AuthFailure::Rejected(err.server_reason().unwrap_or(fallback).to_string())
            }
            _ => AuthFailure::Transport(fallback.to_string()),
        }
    }
}
