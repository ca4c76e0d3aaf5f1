//! Request execution pipeline.
//!
//! [`RequestExecutor::execute`] runs one request through these stages, each
//! of which can end the run with a classified error:
//!
//! 1. derive the [`CacheKey`] and look it up; a hit skips straight to decoding
//! 2. send through the [`Transport`] (the only suspension point)
//! 3. classify the status code; only 200/201 continue
//! 4. for GET, store the response in the cache
//! 5. decode the body
//!
//! The executor holds no per-call state, so one instance serves any number
//! of concurrent calls. Dropping an in-flight `execute` future cancels the
//! transport exchange; because the cache write happens only after the
//! transport has completed, an abandoned call never touches the cache.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CachedResponse, MemoryCache, ResponseCache};
use crate::decode::{DecodeError, JsonDecoder};
use crate::error::{ErrorKind, Outcome, classify, classify_status};
use crate::http::Request;
use crate::transport::{HttpTransport, Transport};

/// Runs requests through cache, transport, classification, and decoding.
///
/// # Examples
///
/// ```rust,no_run
/// use fakestore::executor::RequestExecutor;
/// use fakestore::http::Request;
/// use serde_json::Value;
///
/// # async fn demo() -> Result<(), fakestore::error::ErrorKind> {
/// let executor = RequestExecutor::default();
/// let products: Value = executor
///     .execute_json(&Request::get("https://api.escuelajs.co/api/v1/products"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn ResponseCache>,
    decoder: JsonDecoder,
}

impl RequestExecutor {
    /// Creates an executor over the given transport and cache.
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<dyn ResponseCache>) -> Self {
        Self {
            transport,
            cache,
            decoder: JsonDecoder::default(),
        }
    }

    /// Replaces the decoder used by [`execute_json`](Self::execute_json).
    #[must_use]
    pub fn with_decoder(mut self, decoder: JsonDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn decoder(&self) -> JsonDecoder {
        self.decoder
    }

    /// Executes `request` and decodes the body with `decode`.
    ///
    /// Returns exactly one of the decoded value or a classified error.
    pub async fn execute<T, D>(&self, request: &Request, decode: D) -> Outcome<T>
    where
        D: FnOnce(&[u8]) -> Result<T, DecodeError>,
    {
        let key = CacheKey::from(request);

        let body = match self.cache.lookup(&key) {
            Some(cached) => {
                debug!(key = %key, "cache hit");
                cached.body
            }
            None => {
                debug!(key = %key, "cache miss");
                self.fetch(request, key).await?
            }
        };

        decode(&body).map_err(|e| {
            debug!(url = request.url(), error = %e, "decode failed");
            classify(e)
        })
    }

    /// Executes `request` and decodes the body as JSON with this executor's
    /// decoder.
    pub async fn execute_json<T>(&self, request: &Request) -> Outcome<T>
    where
        T: DeserializeOwned,
    {
        let decoder = self.decoder;
        self.execute(request, move |bytes| decoder.decode(bytes)).await
    }

    async fn fetch(&self, request: &Request, key: CacheKey) -> Outcome<Bytes> {
        let response = self.transport.send(request).await.map_err(|e| {
            warn!(key = %key, error = %e, "transport failed");
            classify(e)
        })?;

        classify_status(response.status, &response.body).inspect_err(|kind| {
            warn!(key = %key, status = ?response.status, error = %kind, "request rejected");
        })?;

        if request.method().is_safe() {
            match CachedResponse::from_raw(&response) {
                Some(cached) => {
                    debug!(key = %key, bytes = cached.body.len(), "caching response");
                    self.cache.save(key, cached);
                }
                // classify_status already rejected a missing status
                None => return Err(ErrorKind::Unknown),
            }
        }

        Ok(response.body)
    }
}

impl Default for RequestExecutor {
    /// An executor over a default [`HttpTransport`] and the process-wide
    /// [`MemoryCache`].
    fn default() -> Self {
        Self::new(
            Arc::new(HttpTransport::new()),
            Arc::new(MemoryCache::shared()),
        )
    }
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}
