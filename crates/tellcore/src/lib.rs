//! Client side of the device service protocol.
//!
//! # Crate Structure
//!
//! - [`transport`] — local socket connection to the service
//! - [`message`] — tagged-token codec, message builder, cursor and reader
//! - [`session`] — explicit request/response sessions (behind `session`)
//!
//! ```no_run
//! use tellcore::message::Message;
//! use tellcore::session::{Session, SessionConfig};
//!
//! # fn main() -> Result<(), tellcore::session::SessionError> {
//! let session = Session::open(&SessionConfig::default())?;
//! let name = session.call_text(&Message::command("tdGetName").with_argument(1))?;
//! println!("device 1 is {name}");
//! session.close()?;
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use tellcore_transport::*;
}

/// Re-export message types.
pub mod message {
    pub use tellcore_message::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use tellcore_session::*;
}
