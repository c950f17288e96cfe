use std::future::Future;

use listing_protocol::ListingPayload;
use serde_json::Value;

/// Shown when a failed submission carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to add item";

/// Performs the network request that creates a listing.
pub trait ListingTransport {
    fn post_multipart(
        &self,
        endpoint: &str,
        payload: ListingPayload,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// A 2xx answer from the remote API.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Response body, when it was valid JSON.
    pub body: Option<Value>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The server answered, but not with success.
    #[error("server responded with status {status}")]
    Status { status: u16, body: Option<Value> },
    /// The request never produced a response (connection, TLS, body encoding...).
    #[error("request failed: {0}")]
    Request(String),
}

/// User-facing text for a failed submission.
///
/// Uses the `message` string from the server's JSON error body when there is a non-empty one,
/// and [`FALLBACK_ERROR_MESSAGE`] otherwise.
pub fn extract_message(err: &TransportError) -> String {
    let message = match err {
        TransportError::Status {
            body: Some(body), ..
        } => body.get("message").and_then(Value::as_str),
        TransportError::Status { body: None, .. } | TransportError::Request(_) => None,
    };
    message
        .filter(|message| !message.is_empty())
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}
