//! Request/response sessions with the device service.
//!
//! A [`Session`] owns one service connection for as long as the caller keeps
//! it. There is no global instance: open one, share it (it is `Sync`), close
//! it when done. Calls from several threads are serialized so at most one
//! request is on the wire at a time.

pub mod config;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::{Reply, Session};
