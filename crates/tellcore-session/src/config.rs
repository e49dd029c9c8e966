use std::path::PathBuf;
use std::time::Duration;

use tellcore_message::CodecConfig;
use tellcore_transport::DEFAULT_SERVICE_PATH;

/// How to reach the service and how long to wait on it.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Socket the service listens on.
    pub socket_path: PathBuf,
    /// Limits and socket timeouts for every call on the session.
    pub codec: CodecConfig,
}

impl SessionConfig {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            codec: CodecConfig::default(),
        }
    }

    /// Bound both reads and writes on the connection.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.codec.read_timeout = Some(timeout);
        self.codec.write_timeout = Some(timeout);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_PATH)
    }
}
