//! Profile feature: the current account as shown in the profile panel. The
//! record is fetched through `AccountGateway::fetch_profile` and never shares
//! state with the session store.

pub mod state;

pub use state::{ProfileEvent, ProfileState, ProfileStore};
