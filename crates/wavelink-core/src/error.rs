//! Error types for wavelink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, protocol-layer, and
//! session-layer errors are all captured here.

/// The error type for all wavelink operations.
///
/// Variants cover the full range of failure modes encountered when driving
/// a serial Wi-Fi module: physical transport failures, malformed or
/// unexpected AT frames, timeouts, and bad parameters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port, USB virtual COM port).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (malformed frame, unexpected reply, module
    /// error response).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a reply or event from the module.
    ///
    /// This typically indicates the module is powered off, the baud rate is
    /// wrong, or the module is still booting.
    #[error("timeout waiting for response")]
    Timeout,

    /// An invalid parameter was passed to a module command.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the module has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the module was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
