//! Albatross Core - framework-independent access gate
//!
//! Path-based authentication gating, session lifetime policy and the login
//! handshake, with the credential store and session store left to callers.

pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod login;
pub mod next_page;
pub mod pattern;
pub mod session;

pub use config::*;
pub use error::*;
pub use gate::*;
pub use logging::*;
pub use login::*;
pub use next_page::*;
pub use pattern::*;
pub use session::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
