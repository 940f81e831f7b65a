//! Domain-level client features (auth, profile, chat). The CLI imports these
//! modules to keep command handling focused while keeping security and API
//! handling in dedicated feature areas.

pub mod auth;
pub mod chat;
pub mod profile;
