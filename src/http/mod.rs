//! HTTP request and response values.
//!
//! This module provides the plain-data primitives the pipeline passes around:
//! [`Method`], [`StatusCode`], [`Headers`], [`Request`], and [`RawResponse`].

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;

pub use headers::Headers;
pub use request::Request;
pub use response::RawResponse;

/// A response status code the pipeline recognises.
///
/// Any other numeric code has no variant; the classifier reports it as
/// [`ErrorKind::Unknown`](crate::error::ErrorKind::Unknown).
///
/// # Examples
///
/// ```
/// use fakestore::http::StatusCode;
///
/// let status = StatusCode::from_u16(201).unwrap();
/// assert_eq!(status, StatusCode::Created);
/// assert!(StatusCode::from_u16(404).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    // 2xx Success
    Ok = 200,
    Created = 201,

    // 4xx Client Error
    BadRequest = 400,
    Unauthorized = 401,
}

impl StatusCode {
    /// Maps a numeric status onto a recognised variant, or `None`.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            201 => Some(Self::Created),
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            _ => None,
        }
    }
}

/// An HTTP request method.
///
/// Only the four methods the store API speaks are representable.
///
/// # Examples
///
/// ```
/// use fakestore::http::Method;
///
/// assert_eq!(Method::Delete.as_str(), "DELETE");
/// assert_eq!(Method::Get.to_string(), "GET");
/// assert!(Method::Get.is_safe());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET: retrieve a representation of the target resource.
    Get,
    /// POST: perform resource-specific processing on the request payload.
    Post,
    /// PUT: replace the target resource's current representation.
    Put,
    /// DELETE: remove the association between the target resource and its functionality.
    Delete,
}

impl Method {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` if this method has no side effects (RFC 9110 §9.2.1).
    ///
    /// Only responses to safe methods are ever written to the response cache.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
