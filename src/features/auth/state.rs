//! Session state container. All mutations go through `SessionEvent` so every
//! transition is visible in one reducer, and observers receive snapshots
//! through a `watch` channel. Only non-sensitive metadata is held here;
//! tokens stay in storage.

use crate::features::auth::types::Account;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub account: Option<Account>,
    pub loading: bool,
    pub error: Option<String>,
    pub otp_success: bool,
    pub is_registered: bool,
    /// Operation whose request is outstanding, if any.
    pub in_flight: Option<SessionOperation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOperation {
    SignIn,
    Register,
    VerifyOtp,
}

/// Sign-in phase derived from the state fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    AuthError,
}

/// Registration phase derived from the state fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationPhase {
    Idle,
    Registering,
    AwaitingOtp,
    Verified,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignInRequested,
    SignInSucceeded(Account),
    SignInFailed(String),
    RegisterRequested,
    RegisterSucceeded,
    RegisterFailed(String),
    OtpRequested,
    OtpVerified,
    OtpFailed(String),
    /// Input rejected locally; no request was in flight.
    ValidationFailed(String),
    RefreshFailed(String),
    /// Fires after logout whether or not the server accepted it.
    LogoutSettled,
    /// Local reset without a server round-trip.
    Reset,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.account.is_some() {
            SessionPhase::Authenticated
        } else if self.in_flight == Some(SessionOperation::SignIn) {
            SessionPhase::Authenticating
        } else if self.error.is_some() {
            SessionPhase::AuthError
        } else {
            SessionPhase::Anonymous
        }
    }

    #[must_use]
    pub fn registration(&self) -> RegistrationPhase {
        if self.otp_success {
            RegistrationPhase::Verified
        } else if self.in_flight == Some(SessionOperation::Register) {
            RegistrationPhase::Registering
        } else if self.is_registered {
            RegistrationPhase::AwaitingOtp
        } else {
            RegistrationPhase::Idle
        }
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SignInRequested => self.start(SessionOperation::SignIn),
            SessionEvent::RegisterRequested => self.start(SessionOperation::Register),
            SessionEvent::OtpRequested => self.start(SessionOperation::VerifyOtp),
            SessionEvent::SignInSucceeded(account) => {
                self.settle();
                self.account = Some(account);
            }
            SessionEvent::RegisterSucceeded => {
                self.settle();
                self.is_registered = true;
            }
            SessionEvent::OtpVerified => {
                self.settle();
                self.otp_success = true;
            }
            SessionEvent::SignInFailed(reason)
            | SessionEvent::RegisterFailed(reason)
            | SessionEvent::OtpFailed(reason) => {
                self.settle();
                self.error = Some(reason);
            }
            SessionEvent::ValidationFailed(reason) => {
                self.error = Some(reason);
            }
            SessionEvent::RefreshFailed(reason) => {
                self.account = None;
                self.error = Some(reason);
            }
            SessionEvent::LogoutSettled | SessionEvent::Reset => {
                self.settle();
                self.account = None;
                self.error = None;
                self.otp_success = false;
                self.is_registered = false;
            }
        }
    }

    fn start(&mut self, operation: SessionOperation) {
        self.loading = true;
        self.in_flight = Some(operation);
        self.error = None;
    }

    fn settle(&mut self) {
        self.loading = false;
        self.in_flight = None;
    }
}

/// Shared handle to the session state. Clones observe and mutate the same state.
#[derive(Clone, Debug)]
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx }
    }

    pub fn dispatch(&self, event: SessionEvent) {
        debug!(event = event_name(&event), "session event");
        self.tx.send_modify(|state| state.apply(event));
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

/// Event label for logs; payloads may carry account data.
fn event_name(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::SignInRequested => "sign_in_requested",
        SessionEvent::SignInSucceeded(_) => "sign_in_succeeded",
        SessionEvent::SignInFailed(_) => "sign_in_failed",
        SessionEvent::RegisterRequested => "register_requested",
        SessionEvent::RegisterSucceeded => "register_succeeded",
        SessionEvent::RegisterFailed(_) => "register_failed",
        SessionEvent::OtpRequested => "otp_requested",
        SessionEvent::OtpVerified => "otp_verified",
        SessionEvent::OtpFailed(_) => "otp_failed",
        SessionEvent::ValidationFailed(_) => "validation_failed",
        SessionEvent::RefreshFailed(_) => "refresh_failed",
        SessionEvent::LogoutSettled => "logout_settled",
        SessionEvent::Reset => "reset",
    }
}
