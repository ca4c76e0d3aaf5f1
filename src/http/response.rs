//! Raw response as delivered by a transport.

use bytes::Bytes;

use super::Headers;

/// Bytes plus transport metadata for one completed round-trip.
///
/// `status` is `None` when the transport delivered a body without usable
/// status metadata; the classifier treats that as an unknown failure.
///
/// # Examples
///
/// ```
/// use fakestore::http::RawResponse;
///
/// let response = RawResponse::new(200, r#"{"id":1}"#)
///     .header("Content-Type", "application/json");
///
/// assert_eq!(response.status, Some(200));
/// assert_eq!(response.headers.get("content-type"), Some("application/json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: Option<u16>,
    pub headers: Headers,
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response with the given status and body and no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: Some(status),
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Creates a response that carries no status metadata.
    pub fn without_status(body: impl Into<Bytes>) -> Self {
        Self {
            status: None,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Appends a response header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}
