//! Local socket transport for talking to the device service.
//!
//! The service listens on a Unix domain socket (by default
//! [`DEFAULT_SERVICE_PATH`]). Clients connect and exchange tagged-token
//! messages over the resulting [`IpcStream`]; nothing in this crate knows
//! about the message format.

pub mod error;
pub mod stream;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use stream::IpcStream;

#[cfg(unix)]
pub use uds::ServiceSocket;

/// Socket path the device service listens on unless configured otherwise.
pub const DEFAULT_SERVICE_PATH: &str = "/tmp/TelldusClient";
