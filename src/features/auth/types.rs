//! Request and response types for account API calls. Request payloads carry
//! passwords, codes and tokens, so they deliberately do not implement `Debug`.

use serde::{Deserialize, Serialize};

/// Account record as returned by the account API. Replaced wholesale on every fetch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub account_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub account: Account,
}

/// Result of a successful registration; the account stays unverified until OTP.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyOtpRequest<'a> {
    pub account_id: &'a str,
    pub otp: &'a str,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenResponse {
    pub access_token: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LogoutResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
pub(crate) struct ProfileResponse {
    pub account: Account,
}
