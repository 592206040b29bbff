//! Endpoint-level error classification.

use std::time::Duration;

/// Errors surfaced by a single remote call against one endpoint.
///
/// These are always transient from the caller's point of view: the fetcher
/// records them against the serving endpoint and fails over to another one.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The call did not complete within the configured bound.
    #[error("rpc call timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused, DNS failure, HTTP error, JSON-RPC error.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered, but the payload fails validation.
    #[error("malformed response: {0}")]
    Malformed(String),
}
