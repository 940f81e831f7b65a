//! Account flows that tie the gateway to the session and profile stores.
//!
//! Every operation reports its outcome twice: the reason lands on the
//! relevant store's `error` field for observers, and the same failure is
//! returned to the caller. Nothing here panics or retries.

use crate::{
    app_lib::storage::{
        ACCESS_TOKEN_KEY, PENDING_ACCOUNT_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS,
    },
    features::{
        auth::{
            client::AccountGateway,
            error::{AuthFailure, MISSING_ACCOUNT_ID},
            state::{SessionEvent, SessionStore},
            types::{Account, Registration},
            validation::{check_credentials, check_otp},
        },
        profile::{ProfileEvent, ProfileStore},
    },
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, instrument, warn};

/// How a logout ended. Local state is cleared in both cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The server revoked the refresh token.
    Revoked { message: String },
    /// Only the local session was cleared; the server-side revocation failed.
    LocalOnly { warning: String },
}

pub struct AuthOrchestrator {
    gateway: AccountGateway,
    session: SessionStore,
    profile: ProfileStore,
}

impl AuthOrchestrator {
    #[must_use]
    pub fn new(gateway: AccountGateway, session: SessionStore, profile: ProfileStore) -> Self {
        Self {
            gateway,
            session,
            profile,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    #[must_use]
    pub fn gateway(&self) -> &AccountGateway {
        &self.gateway
    }

    /// # Errors
    /// Returns the validation or gateway failure, also recorded on the session store.
    #[instrument(skip_all)]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Account, AuthFailure> {
        let email = email.trim();
        self.validate(check_credentials(email, password.expose_secret()))?;

        self.session.dispatch(SessionEvent::SignInRequested);

        match self.gateway.sign_in(email, password).await {
            Ok(account) => {
                info!(account_id = %account.account_id, "sign-in complete");
                self.session
                    .dispatch(SessionEvent::SignInSucceeded(account.clone()));
                Ok(account)
            }
            Err(failure) => {
                self.session
                    .dispatch(SessionEvent::SignInFailed(failure.reason().to_string()));
                Err(failure)
            }
        }
    }

    /// Registers an account; the pending id is stored by the gateway.
    ///
    /// # Errors
    /// Returns the validation or gateway failure, also recorded on the session store.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Registration, AuthFailure> {
        let email = email.trim();
        self.validate(check_credentials(email, password.expose_secret()))?;

        self.session.dispatch(SessionEvent::RegisterRequested);

        match self.gateway.register(email, password).await {
            Ok(registration) => {
                info!(account_id = %registration.account_id, "registration complete");
                self.session.dispatch(SessionEvent::RegisterSucceeded);
                Ok(registration)
            }
            Err(failure) => {
                self.session
                    .dispatch(SessionEvent::RegisterFailed(failure.reason().to_string()));
                Err(failure)
            }
        }
    }

    /// Verifies the pending registration. The code format and the pending id are
    /// checked before any request is made; the pending id is consumed on success.
    ///
    /// # Errors
    /// Returns `AuthFailure::Validation` for local problems, otherwise the gateway failure.
    #[instrument(skip_all)]
    pub async fn verify_otp(&self, otp: &str) -> Result<(), AuthFailure> {
        self.validate(check_otp(otp))?;

        let account_id = self.validate(self.pending_account_id())?;

        self.session.dispatch(SessionEvent::OtpRequested);

        match self.gateway.verify_otp(&account_id, otp).await {
            Ok(_) => {
                self.remove_keys(&[PENDING_ACCOUNT_KEY]);
                info!(account_id = %account_id, "account verified");
                self.session.dispatch(SessionEvent::OtpVerified);
                Ok(())
            }
            Err(failure) => {
                self.session
                    .dispatch(SessionEvent::OtpFailed(failure.reason().to_string()));
                Err(failure)
            }
        }
    }

    /// Refreshes the access token. Any failure invalidates the in-memory session;
    /// an expired session also drops the stored token pair and the profile.
    ///
    /// # Errors
    /// Returns `AuthFailure::SessionExpired` or `AuthFailure::Transport`.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<(), AuthFailure> {
        match self.gateway.refresh_access_token().await {
            Ok(_) => {
                info!("access token refreshed");
                Ok(())
            }
            Err(failure) => {
                self.session
                    .dispatch(SessionEvent::RefreshFailed(failure.reason().to_string()));

                if matches!(failure, AuthFailure::SessionExpired(_)) {
                    self.profile.dispatch(ProfileEvent::Cleared);
                    self.remove_keys(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY]);
                }

                Err(failure)
            }
        }
    }

    /// Signs out. The server call is awaited first (bounded by the request
    /// timeout); local state and session keys are cleared whatever it returns.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> LogoutOutcome {
        let result = self.gateway.logout().await;

        self.clear_local();

        match result {
            Ok(response) => {
                info!("logged out");
                LogoutOutcome::Revoked {
                    message: response.message,
                }
            }
            Err(failure) => {
                warn!("server logout failed: {failure}");
                LogoutOutcome::LocalOnly {
                    warning: failure.reason().to_string(),
                }
            }
        }
    }

    /// Resets session and profile state in memory without touching the server or storage.
    pub fn reset_local(&self) {
        self.session.dispatch(SessionEvent::Reset);
        self.profile.dispatch(ProfileEvent::Cleared);
    }

    /// # Errors
    /// Returns the gateway failure, also recorded on the profile store.
    #[instrument(skip_all)]
    pub async fn fetch_profile(&self) -> Result<Account, AuthFailure> {
        self.profile.dispatch(ProfileEvent::FetchRequested);

        match self.gateway.fetch_profile().await {
            Ok(account) => {
                self.profile
                    .dispatch(ProfileEvent::FetchSucceeded(account.clone()));
                Ok(account)
            }
            Err(failure) => {
                self.profile
                    .dispatch(ProfileEvent::FetchFailed(failure.reason().to_string()));
                Err(failure)
            }
        }
    }

    /// Records a local validation failure on the session store before returning it.
    fn validate<T>(&self, result: Result<T, AuthFailure>) -> Result<T, AuthFailure> {
        result.inspect_err(|failure| {
            self.session
                .dispatch(SessionEvent::ValidationFailed(failure.reason().to_string()));
        })
    }

    fn pending_account_id(&self) -> Result<String, AuthFailure> {
        match self.gateway.storage().get(PENDING_ACCOUNT_KEY) {
            Ok(Some(id)) if !id.trim().is_empty() => Ok(id),
            Ok(_) => Err(AuthFailure::Validation(MISSING_ACCOUNT_ID.to_string())),
            Err(err) => {
                error!("failed to read pending account: {err}");
                Err(AuthFailure::Validation(MISSING_ACCOUNT_ID.to_string()))
            }
        }
    }

    fn clear_local(&self) {
        self.session.dispatch(SessionEvent::LogoutSettled);
        self.profile.dispatch(ProfileEvent::Cleared);
        self.remove_keys(&SESSION_KEYS);
    }

    fn remove_keys(&self, keys: &[&str]) {
        for key in keys {
            if let Err(err) = self.gateway.storage().remove(key) {
                error!("failed to remove {key}: {err}");
            }
        }
    }
}
