//! Auth feature module covering sign-in, registration with OTP verification,
//! token refresh and logout. It keeps authentication logic out of the CLI and
//! must stay aligned with the account API contract. This module touches
//! security boundaries and must avoid logging secrets or token material.
//!
//! Flow Overview: sign-in stores the token pair and sets the session account.
//! Registration stores a pending account id that OTP verification consumes.
//! Refresh swaps the access token or invalidates the session. Logout always
//! clears local state, even when the server cannot revoke the token.

pub mod client;
pub mod error;
pub mod orchestrator;
pub mod state;
pub mod types;
pub mod validation;

pub use client::AccountGateway;
pub use error::AuthFailure;
pub use orchestrator::{AuthOrchestrator, LogoutOutcome};
pub use state::{RegistrationPhase, SessionEvent, SessionPhase, SessionState, SessionStore};
pub use types::{Account, Registration};
