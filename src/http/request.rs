//! Immutable outgoing request descriptor.

use bytes::Bytes;

use super::{Headers, Method};

/// A fully-formed outgoing HTTP request.
///
/// `Request` is a value: every `with_*` method consumes `self` and returns a
/// new descriptor, so a request handed to the pipeline can be shared freely
/// between concurrent stages without anyone observing a later change.
///
/// # Examples
///
/// ```
/// use fakestore::http::{Method, Request};
///
/// let request = Request::get("https://api.escuelajs.co/api/v1/products/1")
///     .with_header("Accept", "*/*")
///     .with_bearer("secret");
///
/// assert_eq!(request.method(), Method::Get);
/// assert_eq!(request.headers().get("authorization"), Some("Bearer secret"));
/// assert!(request.body().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: String,
    headers: Headers,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Shorthand for `Request::new(Method::Get, url)`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Returns a copy with the method replaced.
    #[must_use]
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    /// Returns a copy with one header set (last write wins).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns a copy with `headers` merged over the existing ones.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers.merge(headers);
        self
    }

    /// Returns a copy carrying `body`.
    #[must_use]
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            ..self
        }
    }

    /// Returns a copy carrying a JSON body and the matching `Content-Type`.
    #[must_use]
    pub fn with_json_payload(self, body: impl Into<Bytes>) -> Self {
        self.with_body(body)
            .with_header("Content-Type", "application/json")
    }

    /// Returns a copy authorised with `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the target address.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body bytes, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
