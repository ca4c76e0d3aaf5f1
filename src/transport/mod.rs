//! Network I/O boundary.
//!
//! A [`Transport`] sends one [`Request`] and resolves to the raw bytes and
//! metadata of the response, or to a [`TransportError`] that says how far the
//! exchange got. This is the only suspending step of the pipeline; dropping
//! the returned future abandons the exchange.
//!
//! [`HttpTransport`] is the production implementation on top of `reqwest`.
//! Tests substitute their own implementation.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use tracing::trace;

use crate::config::StoreConfig;
use crate::http::{Headers, Method, RawResponse, Request};

/// Failures that happen before a response with a status line is in hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The descriptor could not be turned into a valid request.
    #[error("invalid request{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    InvalidRequest { detail: Option<String> },

    /// The request was sent but no response arrived.
    #[error("no response: {detail}")]
    NoResponse { detail: String },

    /// The exchange was abandoned before completion.
    ///
    /// For transports that observe an abort signal of their own and still
    /// resolve. [`HttpTransport`] never reports it: dropping its future ends
    /// the exchange without any result.
    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Returns the diagnostic text the transport attached, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest { detail } => detail.as_deref(),
            Self::NoResponse { detail } => Some(detail),
            Self::Cancelled => None,
        }
    }
}

/// Future returned by [`Transport::send`].
pub type SendFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>>;

/// Sends a request over the network.
///
/// # Examples
///
/// ```rust
/// use fakestore::http::{RawResponse, Request};
/// use fakestore::transport::{SendFuture, Transport};
///
/// struct Canned;
///
/// impl Transport for Canned {
///     fn send<'a>(&'a self, _request: &'a Request) -> SendFuture<'a> {
///         Box::pin(async { Ok(RawResponse::new(200, "[]")) })
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: &'a Request) -> SendFuture<'a>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds a client honouring the configured request timeout.
    pub fn from_config(config: &StoreConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::InvalidRequest {
            detail: Some(e.to_string()),
        })?;
        Ok(Self { client })
    }

    fn build(&self, request: &Request) -> Result<reqwest::Request, TransportError> {
        let url = reqwest::Url::parse(request.url()).map_err(|e| TransportError::InvalidRequest {
            detail: Some(format!("{}: {e}", request.url())),
        })?;

        let mut headers = HeaderMap::with_capacity(request.headers().len());
        for (name, value) in request.headers().iter() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidRequest {
                    detail: Some(format!("header {name:?}: {e}")),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::InvalidRequest {
                    detail: Some(format!("header {name}: {e}")),
                }
            })?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), url)
            .headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }
        builder.build().map_err(|e| TransportError::InvalidRequest {
            detail: Some(e.to_string()),
        })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a Request) -> SendFuture<'a> {
        Box::pin(async move {
            let outgoing = self.build(request)?;
            trace!(method = %request.method(), url = request.url(), "sending request");

            let response = self.client.execute(outgoing).await.map_err(from_reqwest)?;
            let status = response.status().as_u16();
            let headers: Headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
                })
                .collect();
            let body = response.bytes().await.map_err(from_reqwest)?;

            Ok(RawResponse {
                status: Some(status),
                headers,
                body,
            })
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn from_reqwest(error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::InvalidRequest {
            detail: Some(error.to_string()),
        }
    } else {
        TransportError::NoResponse {
            detail: error.to_string(),
        }
    }
}
