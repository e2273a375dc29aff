//! Error types for tapconnect

use thiserror::Error;

/// Main error type for the tapconnect library
///
/// No reporting-cycle failure crosses the public boundary as an error; the
/// host observes a single boolean outcome. The variants keep the failure
/// causes apart in logs and tests.
#[derive(Error, Debug)]
pub enum Error {
    /// Host configuration error (missing app id or client package)
    #[error("configuration error: {0}")]
    Config(String),

    /// Settings store error
    #[error("settings store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure during the connect call
    #[error("transport error ({kind:?}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    /// Malformed acknowledgement document
    #[error("response error: {0}")]
    Response(String),

    /// Well-formed acknowledgement without `Success` equal to "true"
    #[error("server did not acknowledge success")]
    NegativeAck,
}

/// Classification of transport failures, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Failed to establish a connection (includes connect timeout)
    Connect,
    /// Request or body read timed out
    Timeout,
    /// The assembled URL was not a valid URL
    InvalidUrl,
    /// Any other IO failure during request or body read
    Io,
}

/// Result type alias for tapconnect
pub type Result<T> = std::result::Result<T, Error>;
