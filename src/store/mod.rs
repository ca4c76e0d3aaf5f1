//! Caller-facing operations on the store API.
//!
//! Each method builds one [`Request`] from an [`Endpoint`], hands it to the
//! [`RequestExecutor`], and resolves to exactly one [`Outcome`].
//!
//! Payload encoding happens before the pipeline runs. The DTOs in [`types`]
//! always serialize, so an encoding failure is a programming error and
//! panics instead of surfacing as [`ErrorKind::Unknown`].

use std::fmt;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::cache::MemoryCache;
use crate::config::StoreConfig;
use crate::decode::{JsonEncoder, decode_bytes};
use crate::endpoint::Endpoint;
use crate::error::{ErrorKind, Outcome};
use crate::executor::RequestExecutor;
use crate::http::{Method, Request};
use crate::transport::{HttpTransport, TransportError};
use crate::validate::is_valid_email;

pub mod types;

use types::{
    Availability, Category, Credentials, NewCategory, NewProduct, NewUser, Product, Tokens,
    Uploaded, User,
};

/// Boundary separating parts of an upload body.
const MULTIPART_BOUNDARY: &str = "fakestore-7c1b0e4a9d2f";

/// Client for the Platzi Fake Store API.
///
/// Cheap to clone; clones share the transport and cache.
///
/// # Examples
///
/// ```rust,no_run
/// use fakestore::config::StoreConfig;
/// use fakestore::store::Store;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Store::new(StoreConfig::from_env()?)?;
///     for product in store.product_list(10, 0).await? {
///         println!("{}: {}", product.id, product.title);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Store {
    executor: RequestExecutor,
    encoder: JsonEncoder,
    base_url: String,
}

impl Store {
    /// Creates a store with an HTTP transport and its own bounded cache.
    pub fn new(config: StoreConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::from_config(&config)?;
        let cache = MemoryCache::with_capacity(config.cache_capacity);
        let executor = RequestExecutor::new(Arc::new(transport), Arc::new(cache));
        Ok(Self::with_executor(executor, config))
    }

    /// Creates a store over an existing executor.
    pub fn with_executor(executor: RequestExecutor, config: StoreConfig) -> Self {
        Self {
            executor,
            encoder: JsonEncoder::default(),
            base_url: config.base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Products ────────────────────────────────────────────────────────────

    pub async fn product_list(&self, limit: u32, offset: u32) -> Outcome<Vec<Product>> {
        self.get(Endpoint::product_list(offset, limit)).await
    }

    pub async fn product(&self, id: u64) -> Outcome<Product> {
        self.get(Endpoint::product(id)).await
    }

    /// Products whose title matches `title`.
    pub async fn search_products(
        &self,
        title: &str,
        limit: u32,
        offset: u32,
    ) -> Outcome<Vec<Product>> {
        self.get(Endpoint::product_search(title, limit, offset)).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Outcome<Product> {
        self.send(Method::Post, Endpoint::products(), product).await
    }

    pub async fn update_product(&self, id: u64, product: &NewProduct) -> Outcome<Product> {
        self.send(Method::Put, Endpoint::product(id), product).await
    }

    /// Resolves to the server's confirmation flag.
    pub async fn delete_product(&self, id: u64) -> Outcome<bool> {
        self.delete(Endpoint::product(id)).await
    }

    // ── Categories ──────────────────────────────────────────────────────────

    pub async fn category_list(&self, limit: u32) -> Outcome<Vec<Category>> {
        self.get(Endpoint::category_list(limit)).await
    }

    pub async fn category(&self, id: u64) -> Outcome<Category> {
        self.get(Endpoint::category(id)).await
    }

    pub async fn create_category(&self, category: &NewCategory) -> Outcome<Category> {
        self.send(Method::Post, Endpoint::categories(), category).await
    }

    pub async fn update_category(&self, id: u64, category: &NewCategory) -> Outcome<Category> {
        self.send(Method::Put, Endpoint::category(id), category).await
    }

    pub async fn delete_category(&self, id: u64) -> Outcome<bool> {
        self.delete(Endpoint::category(id)).await
    }

    pub async fn products_in_category(
        &self,
        category_id: u64,
        limit: u32,
        offset: u32,
    ) -> Outcome<Vec<Product>> {
        self.get(Endpoint::products_for(category_id, limit, offset))
            .await
    }

    // ── Users ───────────────────────────────────────────────────────────────

    pub async fn user_list(&self, limit: u32) -> Outcome<Vec<User>> {
        self.get(Endpoint::user_list(limit)).await
    }

    pub async fn user(&self, id: u64) -> Outcome<User> {
        self.get(Endpoint::user(id)).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Outcome<User> {
        self.send(Method::Post, Endpoint::users(), user).await
    }

    pub async fn update_user(&self, id: u64, user: &NewUser) -> Outcome<User> {
        self.send(Method::Put, Endpoint::user(id), user).await
    }

    /// Asks whether `email` is free to register.
    ///
    /// A malformed address fails with [`ErrorKind::BadRequest`] without
    /// touching the network.
    pub async fn is_email_available(&self, email: &str) -> Outcome<bool> {
        if !is_valid_email(email) {
            return Err(ErrorKind::BadRequest(format!("malformed email address: {email}")));
        }

        #[derive(Serialize)]
        struct EmailQuery<'a> {
            email: &'a str,
        }

        let availability: Availability = self
            .send(Method::Post, Endpoint::user_is_available(), &EmailQuery { email })
            .await?;
        Ok(availability.is_available)
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Outcome<Tokens> {
        let credentials = Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        self.send(Method::Post, Endpoint::login(), &credentials).await
    }

    /// The user the access token belongs to.
    ///
    /// Responses are cached by address alone, so a profile fetched with one
    /// token is served to later calls with any other token.
    pub async fn profile(&self, access_token: &str) -> Outcome<User> {
        let request = self.request(Method::Get, Endpoint::profile()).with_bearer(access_token);
        self.executor.execute_json(&request).await
    }

    // ── Files ───────────────────────────────────────────────────────────────

    /// Uploads one file as `multipart/form-data`.
    ///
    /// A file name or MIME type containing a line break fails with
    /// [`ErrorKind::BadRequest`] without touching the network.
    pub async fn upload(&self, file_name: &str, mime: &str, contents: &[u8]) -> Outcome<Uploaded> {
        if let Some(field) = [("file name", file_name), ("MIME type", mime)]
            .into_iter()
            .find_map(|(field, value)| value.contains(['\r', '\n']).then_some(field))
        {
            return Err(ErrorKind::BadRequest(format!("line break in upload {field}")));
        }

        let request = self
            .request(Method::Post, Endpoint::upload())
            .with_header(
                "Content-Type",
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .with_body(multipart_body(file_name, mime, contents));
        self.executor.execute_json(&request).await
    }

    /// Raw contents of a previously uploaded file.
    pub async fn file(&self, name: &str) -> Outcome<Bytes> {
        let request = self.request(Method::Get, Endpoint::file(name));
        self.executor.execute(&request, decode_bytes).await
    }

    // ── Plumbing ────────────────────────────────────────────────────────────

    fn request(&self, method: Method, endpoint: Endpoint) -> Request {
        Request::new(method, endpoint.url(&self.base_url))
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Outcome<T> {
        let request = self.request(Method::Get, endpoint);
        self.executor.execute_json(&request).await
    }

    async fn delete<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Outcome<T> {
        let request = self.request(Method::Delete, endpoint);
        self.executor.execute_json(&request).await
    }

    async fn send<P, T>(&self, method: Method, endpoint: Endpoint, payload: &P) -> Outcome<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = self
            .request(method, endpoint)
            .with_json_payload(self.encode(payload));
        self.executor.execute_json(&request).await
    }

    fn encode<P: Serialize>(&self, payload: &P) -> Bytes {
        match self.encoder.encode(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "payload encoding failed");
                panic!("request payload must serialize: {e}");
            }
        }
    }
}

impl Default for Store {
    /// A store on the default configuration, sharing the process-wide cache.
    fn default() -> Self {
        Self::with_executor(RequestExecutor::default(), StoreConfig::default())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("base_url", &self.base_url)
            .field("executor", &self.executor)
            .finish()
    }
}

/// Quotes a `filename` parameter value, escaping `\` and `"`.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Builds a single-part `multipart/form-data` body under field `file`.
///
/// Callers reject line breaks in `file_name` and `mime` beforehand.
fn multipart_body(file_name: &str, mime: &str, contents: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(contents.len() + 256);
    buf.put(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    let disposition = format!(
        "Content-Disposition: form-data; name=\"file\"; filename={}\r\n",
        quoted(file_name)
    );
    buf.put(disposition.as_bytes());
    buf.put(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    buf.put(contents);
    buf.put(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    buf.freeze()
}
