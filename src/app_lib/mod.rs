//! Shared client utilities for API access, configuration, errors, and durable storage.
//!
//! ## Core Account Flows
//!
//! ### Sign-up & OTP Verification
//!
//! 1. **Register:** POST `/account/register`; the returned `accountId` is kept under
//!    `pendingAccountId` so verification survives a restart.
//! 2. **Verify:** POST `/account/verify-otp` with the stored id and a 4-digit code. The
//!    pending marker is consumed on success.
//!
//! ### Session
//!
//! Sign-in stores an access/refresh token pair. Refresh swaps the access token; logout
//! revokes the refresh token server-side and always wipes the local session keys.
//!
//! Centralizing these helpers keeps network behavior consistent and avoids duplicated
//! logic in features and the CLI. Callers must avoid logging tokens or passwords.

pub mod api;
pub mod config;
pub mod errors;
pub mod storage;

pub use api::ApiClient;
pub use config::AppConfig;
pub use errors::AppError;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
