//! Client-side chat session manager.
//!
//! Owns the credential, the realtime connection (via `parley-net`), the
//! single-room membership state machine, and the room-scoped message log.
//! The embedding application constructs a [`Session`] with a
//! [`ClientConfig`], calls its command methods, and pumps
//! [`session::SessionEvent`]s through [`Session::apply`] from one task.

pub mod config;
pub mod encoder;
pub mod rest;
pub mod session;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use rest::{RestClient, RestError};
pub use session::{Session, SessionEvent};
pub use state::{ConnState, SessionState};

/// Initialise tracing with an env-filter override (`RUST_LOG`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("parley_client=debug,parley_net=debug,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
