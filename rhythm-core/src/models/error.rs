use thiserror::Error;

/// Errors that can occur while capturing and analyzing loopback audio.
///
/// Session errors are terminal for the session that raised them. Nothing in
/// this crate retries; a new `start` is required to recover.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// A session setup step failed (enumeration, activation, format
    /// retrieval, client initialization, service acquisition, stream start).
    #[error("session init failed at {step}: {reason}")]
    SessionInit { step: &'static str, reason: String },

    /// The negotiated mix format cannot be analyzed.
    #[error("unsupported stream format: {0}")]
    UnsupportedFormat(String),

    /// Polling, acquiring or releasing a packet failed mid-loop.
    #[error("packet error at {step}: {reason}")]
    Packet { step: &'static str, reason: String },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("failed to spawn capture thread: {0}")]
    ThreadSpawn(String),
}

impl CaptureError {
    pub fn session_init(step: &'static str, reason: impl ToString) -> Self {
        Self::SessionInit {
            step,
            reason: reason.to_string(),
        }
    }

    pub fn packet(step: &'static str, reason: impl ToString) -> Self {
        Self::Packet {
            step,
            reason: reason.to_string(),
        }
    }
}
