//! Profile state container, independent of the session store. A failed fetch
//! clears the account so stale profile data is never shown.

use crate::features::auth::types::Account;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub account: Option<Account>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileEvent {
    FetchRequested,
    FetchSucceeded(Account),
    FetchFailed(String),
    Cleared,
}

impl ProfileState {
    pub fn apply(&mut self, event: ProfileEvent) {
        match event {
            ProfileEvent::FetchRequested => {
                self.loading = true;
                self.error = None;
            }
            ProfileEvent::FetchSucceeded(account) => {
                self.loading = false;
                self.account = Some(account);
            }
            ProfileEvent::FetchFailed(reason) => {
                self.loading = false;
                self.account = None;
                self.error = Some(reason);
            }
            ProfileEvent::Cleared => *self = Self::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProfileStore {
    tx: watch::Sender<ProfileState>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProfileState::default());
        Self { tx }
    }

    pub fn dispatch(&self, event: ProfileEvent) {
        debug!(cleared = matches!(event, ProfileEvent::Cleared), "profile event");
        self.tx.send_modify(|state| state.apply(event));
    }

    #[must_use]
    pub fn snapshot(&self) -> ProfileState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.tx.subscribe()
    }
}
