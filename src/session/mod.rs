//! Per-session dashboard state.
//!
//! Each browser gets its own [`SessionState`] behind an async mutex, found
//! through a random id kept in a cookie. Nothing about a session is global.

mod state;
mod store;

pub use state::AuthStatus;
pub use state::RECENT_TRACKS;
pub use state::SessionState;
pub use store::SESSION_IDLE_TIMEOUT;
pub use store::Session;
pub use store::SessionStore;
