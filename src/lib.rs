//! # fakestore
//!
//! A typed, cached, error-classified async client for the Platzi Fake Store
//! REST API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fakestore::{Store, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::new(StoreConfig::default())?;
//!     let product = store.product(1).await?;
//!     println!("{}", product.title);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! Every operation funnels into [`RequestExecutor::execute`]: cache lookup,
//! transport on a miss, status classification, cache write for GET, decode.
//! Failures surface as one of the [`ErrorKind`] variants.

// ── Pipeline ──────────────────────────────────────────────────────────────────
pub mod cache;
pub mod decode;
pub mod error;
pub mod executor;
pub mod http;
pub mod transport;

// ── Collaborators and caller surface ─────────────────────────────────────────
pub mod config;
pub mod endpoint;
pub mod store;
pub mod validate;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{CacheKey, CachedResponse, MemoryCache, NoCache, ResponseCache};
pub use config::{ConfigError, StoreConfig};
pub use decode::{DecodeError, JsonDecoder, JsonEncoder, KeyStrategy};
pub use error::{ErrorKind, Outcome, classify};
pub use executor::RequestExecutor;
pub use http::{Headers, Method, RawResponse, Request, StatusCode};
pub use store::Store;
pub use transport::{HttpTransport, Transport, TransportError};
