//! Client wrappers for the account API endpoints. Each call is a single
//! request/response exchange with no retry. Token persistence happens here so
//! callers never handle raw token strings.

use crate::{
    app_lib::{
        storage::{ACCESS_TOKEN_KEY, PENDING_ACCOUNT_KEY, REFRESH_TOKEN_KEY},
        ApiClient, AppConfig, AppError, KeyValueStore,
    },
    features::auth::{
        error::{
            AuthFailure, LOGOUT_FAILED, NO_REFRESH_TOKEN, OTP_VERIFICATION_FAILED,
            PROFILE_FETCH_FAILED, REGISTRATION_FAILED, SESSION_EXPIRED, SIGN_IN_FAILED,
        },
        types::{
            Account, CredentialsRequest, LogoutResponse, ProfileResponse, RefreshTokenRequest,
            RefreshTokenResponse, Registration, SignInResponse, VerifyOtpRequest,
            VerifyOtpResponse,
        },
    },
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

pub const SIGN_IN_PATH: &str = "/account/signin";
pub const REGISTER_PATH: &str = "/account/register";
pub const VERIFY_OTP_PATH: &str = "/account/verify-otp";
pub const REFRESH_PATH: &str = "/account/refresh";
pub const LOGOUT_PATH: &str = "/account/logout";
pub const PROFILE_PATH: &str = "/account/me";

/// Account API gateway bound to one base URL and one storage backend.
#[derive(Clone)]
pub struct AccountGateway {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
}

impl AccountGateway {
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: &AppConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api_base_url, config)?;
        Ok(Self { api, storage })
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Signs in and stores the returned token pair; only the account is returned.
    ///
    /// # Errors
    /// Returns `AuthFailure` with the server reason or "Sign in failed".
    #[instrument(skip_all)]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Account, AuthFailure> {
        let body = CredentialsRequest {
            email,
            password: password.expose_secret(),
        };

        let response: SignInResponse = self
            .api
            .post_json(SIGN_IN_PATH, &body, None)
            .await
            .map_err(|err| failure(&err, SIGN_IN_FAILED))?;

        self.persist(ACCESS_TOKEN_KEY, &response.access_token, SIGN_IN_FAILED)?;
        if let Err(refused) =
            self.persist(REFRESH_TOKEN_KEY, &response.refresh_token, SIGN_IN_FAILED)
        {
            // A lone access token would read as a live session.
            if let Err(err) = self.storage.remove(ACCESS_TOKEN_KEY) {
                error!("failed to remove {ACCESS_TOKEN_KEY}: {err}");
            }
            return Err(refused);
        }

        debug!(account_id = %response.account.account_id, "signed in");

        Ok(response.account)
    }

    /// Registers an account and keeps its id as the pending registration.
    ///
    /// # Errors
    /// Returns `AuthFailure` with the server reason or "Registration failed".
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Registration, AuthFailure> {
        let body = CredentialsRequest {
            email,
            password: password.expose_secret(),
        };

        let registration: Registration = self
            .api
            .post_json(REGISTER_PATH, &body, None)
            .await
            .map_err(|err| failure(&err, REGISTRATION_FAILED))?;

        if registration.account_id.is_empty() {
            warn!("registration response did not include an accountId");
            return Err(AuthFailure::Rejected(REGISTRATION_FAILED.to_string()));
        }

        self.persist(
            PENDING_ACCOUNT_KEY,
            &registration.account_id,
            REGISTRATION_FAILED,
        )?;

        debug!(account_id = %registration.account_id, "registration pending verification");

        Ok(registration)
    }

    /// Submits an OTP for a pending account. The code format is the caller's job.
    ///
    /// # Errors
    /// Returns `AuthFailure` with the server reason or "OTP verification failed".
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(
        &self,
        account_id: &str,
        otp: &str,
    ) -> Result<VerifyOtpResponse, AuthFailure> {
        let body = VerifyOtpRequest { account_id, otp };

        let response: VerifyOtpResponse = self
            .api
            .post_json(VERIFY_OTP_PATH, &body, None)
            .await
            .map_err(|err| failure(&err, OTP_VERIFICATION_FAILED))?;

        if response.success == Some(false) {
            let reason = response
                .message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(OTP_VERIFICATION_FAILED);
            return Err(AuthFailure::Rejected(reason.to_string()));
        }

        Ok(response)
    }

    /// Exchanges the stored refresh token for a new access token and stores it.
    ///
    /// # Errors
    /// Returns `AuthFailure::SessionExpired` when no refresh token is stored or the
    /// server rejects it, `AuthFailure::Transport` when the server is unreachable.
    #[instrument(skip_all)]
    pub async fn refresh_access_token(&self) -> Result<SecretString, AuthFailure> {
        let Some(refresh_token) = self.read(REFRESH_TOKEN_KEY) else {
            debug!("no refresh token stored");
            return Err(AuthFailure::SessionExpired(SESSION_EXPIRED.to_string()));
        };

        let body = RefreshTokenRequest {
            refresh_token: refresh_token.as_str(),
        };

        let response: RefreshTokenResponse = match self.api.post_json(REFRESH_PATH, &body, None).await
        {
            Ok(response) => response,
            Err(err @ AppError::Http { .. }) => {
                warn!("refresh rejected: {err}");
                return Err(AuthFailure::SessionExpired(SESSION_EXPIRED.to_string()));
            }
            Err(err) => {
                warn!("refresh failed: {err}");
                return Err(AuthFailure::Transport(SESSION_EXPIRED.to_string()));
            }
        };

        self.persist(ACCESS_TOKEN_KEY, &response.access_token, SESSION_EXPIRED)?;

        Ok(SecretString::from(response.access_token))
    }

    /// Revokes the stored refresh token server-side. Local cleanup is the caller's job.
    ///
    /// # Errors
    /// Returns "No refresh token found" without a request when nothing is stored,
    /// otherwise the server reason or "Logout failed".
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<LogoutResponse, AuthFailure> {
        let Some(refresh_token) = self.read(REFRESH_TOKEN_KEY) else {
            return Err(AuthFailure::Rejected(NO_REFRESH_TOKEN.to_string()));
        };

        let body = RefreshTokenRequest {
            refresh_token: refresh_token.as_str(),
        };

        self.api
            .post_json(LOGOUT_PATH, &body, self.access_token().as_ref())
            .await
            .map_err(|err| failure(&err, LOGOUT_FAILED))
    }

    /// Fetches the current account using the stored access token.
    ///
    /// # Errors
    /// Returns `AuthFailure` with the server reason or "Failed to fetch profile".
    #[instrument(skip_all)]
    pub async fn fetch_profile(&self) -> Result<Account, AuthFailure> {
        let response: ProfileResponse = self
            .api
            .get_json(PROFILE_PATH, self.access_token().as_ref())
            .await
            .map_err(|err| failure(&err, PROFILE_FETCH_FAILED))?;

        Ok(response.account)
    }

    fn access_token(&self) -> Option<SecretString> {
        self.read(ACCESS_TOKEN_KEY).map(SecretString::from)
    }

    /// Storage read errors are treated as a missing value.
    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                error!("failed to read {key}: {err}");
                None
            }
        }
    }

    fn persist(&self, key: &str, value: &str, fallback: &str) -> Result<(), AuthFailure> {
        self.storage.set(key, value).map_err(|err| {
            error!("failed to store {key}: {err}");
            AuthFailure::Transport(fallback.to_string())
        })
    }
}

fn failure(err: &AppError, fallback: &str) -> AuthFailure {
    warn!("account request failed: {err}");
    AuthFailure::from_app_error(err, fallback)
}
