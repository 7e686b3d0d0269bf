//! Session lifetime policy applied at successful login

use serde::{Deserialize, Serialize};

/// Form value a checked "remember me" checkbox submits
pub const REMEMBER_ME_ON: &str = "on";

/// Expiry directive for an established session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionExpiry {
    /// Expire when the browser closes (expiry 0)
    BrowserSession,
    /// Keep the store's default persisted lifetime
    #[default]
    Persistent,
}

/// A freshly established session owned by a session store
pub trait SessionHandle {
    fn expiry(&self) -> SessionExpiry;

    fn set_expiry(&mut self, expiry: SessionExpiry);
}

/// Downgrade `session` to browser-session expiry unless `persist` is set.
///
/// A persisted session is left untouched so it keeps whatever default the
/// store gave it.
pub fn apply_session_policy<H: SessionHandle + ?Sized>(persist: bool, session: &mut H) {
    if !persist {
        session.set_expiry(SessionExpiry::BrowserSession);
    }
}

/// Interpret the raw "remember me" form value
pub fn remember_me_requested(value: Option<&str>) -> bool {
    value == Some(REMEMBER_ME_ON)
}
