//! Caller-visible failure taxonomy.
//!
//! Every failure the pipeline can meet (transport, HTTP status, decoding) is
//! mapped exactly once, where it first occurs, onto the closed [`ErrorKind`]
//! set. Detail strings are for diagnostics only; callers branch on the variant.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::http::StatusCode;
use crate::transport::TransportError;

/// Result of one pipeline run: a typed value or exactly one [`ErrorKind`].
pub type Outcome<T> = Result<T, ErrorKind>;

/// Closed set of failure categories surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// Anything that does not fit one of the other categories, including
    /// unrecognised status codes and responses without a status.
    #[error("unknown error")]
    Unknown,

    /// The server answered 400; the detail is the response body as text.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The server answered 401.
    #[error("unauthorized")]
    Unauthorized,

    /// The request could not be built or delivered.
    #[error("bad URL{}", .0.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    BadUrl(Option<String>),

    /// The body arrived but could not be decoded into the requested type.
    #[error("decode failure: {0}")]
    DecodeFailure(String),
}

/// Any cause the classifier accepts.
#[derive(Debug)]
pub enum Failure {
    Classified(ErrorKind),
    Transport(TransportError),
    Decode(DecodeError),
    Other(String),
}

impl From<ErrorKind> for Failure {
    fn from(kind: ErrorKind) -> Self {
        Failure::Classified(kind)
    }
}

impl From<TransportError> for Failure {
    fn from(err: TransportError) -> Self {
        Failure::Transport(err)
    }
}

impl From<DecodeError> for Failure {
    fn from(err: DecodeError) -> Self {
        Failure::Decode(err)
    }
}

/// Maps a failure cause onto the taxonomy.
///
/// Total over [`Failure`] and idempotent: an already classified
/// [`ErrorKind`] comes back unchanged.
///
/// # Examples
///
/// ```
/// use fakestore::error::{classify, ErrorKind};
/// use fakestore::transport::TransportError;
///
/// let kind = classify(TransportError::InvalidRequest { detail: None });
/// assert_eq!(kind, ErrorKind::BadUrl(None));
/// assert_eq!(classify(kind.clone()), kind);
/// ```
pub fn classify(cause: impl Into<Failure>) -> ErrorKind {
    match cause.into() {
        Failure::Classified(kind) => kind,
        Failure::Transport(err) => ErrorKind::BadUrl(err.detail().map(str::to_owned)),
        Failure::Decode(err) => ErrorKind::DecodeFailure(err.to_string()),
        Failure::Other(_) => ErrorKind::Unknown,
    }
}

/// Checks a response status before the body is trusted.
///
/// 200 and 201 pass. 400 fails with the body as text (empty when the body is
/// not UTF-8), 401 fails as unauthorised, and any other code, or a missing
/// status, fails as unknown.
pub fn classify_status(status: Option<u16>, body: &[u8]) -> Result<(), ErrorKind> {
    match status.and_then(StatusCode::from_u16) {
        Some(StatusCode::Ok | StatusCode::Created) => Ok(()),
        Some(StatusCode::BadRequest) => Err(ErrorKind::BadRequest(
            std::str::from_utf8(body).map(str::to_owned).unwrap_or_default(),
        )),
        Some(StatusCode::Unauthorized) => Err(ErrorKind::Unauthorized),
        None => Err(ErrorKind::Unknown),
    }
}
