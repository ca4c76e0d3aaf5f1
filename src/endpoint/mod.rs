//! Endpoint path and query builder for the store API.
//!
//! An [`Endpoint`] is a relative path plus ordered query parameters. It only
//! becomes an address once joined with a base URL through [`Endpoint::url`].

use reqwest::Url;

/// A relative API path with query parameters.
///
/// # Examples
///
/// ```
/// use fakestore::endpoint::Endpoint;
///
/// let endpoint = Endpoint::product_list(0, 20);
/// assert_eq!(
///     endpoint.url("https://api.escuelajs.co/api/v1"),
///     "https://api.escuelajs.co/api/v1/products?limit=20&offset=0"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Endpoint {
    /// Starts from a `/`-separated relative path.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            segments: path
                .as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            query: Vec::new(),
        }
    }

    /// Appends one path segment.
    ///
    /// The segment is taken literally: `/`, `?`, `#` and `%` inside it are
    /// percent-encoded when the address is built.
    #[must_use]
    pub fn add_path(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn limit(self, limit: u32) -> Self {
        self.query("limit", limit)
    }

    #[must_use]
    pub fn limit_offset(self, limit: u32, offset: u32) -> Self {
        self.limit(limit).query("offset", offset)
    }

    /// The unencoded path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Joins this endpoint onto `base`, percent-encoding path segments and
    /// query values.
    ///
    /// A base that is not a valid URL is joined textually; the transport
    /// reports the resulting address as invalid.
    pub fn url(&self, base: &str) -> String {
        let Ok(mut url) = Url::parse(base) else {
            return self.join_textually(base);
        };
        match url.path_segments_mut() {
            Ok(mut path) => {
                path.pop_if_empty().extend(&self.segments);
            }
            Err(()) => return self.join_textually(base),
        }
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        url.into()
    }

    fn join_textually(&self, base: &str) -> String {
        let mut joined = format!("{}/{}", base.trim_end_matches('/'), self.segments.join("/"));
        if !self.query.is_empty() {
            let query: Vec<String> = self.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            joined.push('?');
            joined.push_str(&query.join("&"));
        }
        joined
    }

    // ── Products ────────────────────────────────────────────────────────────

    pub fn products() -> Self {
        Self::new("products")
    }

    pub fn product_list(offset: u32, limit: u32) -> Self {
        Self::products().limit_offset(limit, offset)
    }

    pub fn product(id: u64) -> Self {
        Self::products().add_path(id.to_string())
    }

    /// Products whose title matches `title`.
    pub fn product_search(title: &str, limit: u32, offset: u32) -> Self {
        Self::products()
            .query("title", title)
            .limit_offset(limit, offset)
    }

    // ── Users ───────────────────────────────────────────────────────────────

    pub fn users() -> Self {
        Self::new("users")
    }

    pub fn user_list(limit: u32) -> Self {
        Self::users().limit(limit)
    }

    pub fn user(id: u64) -> Self {
        Self::users().add_path(id.to_string())
    }

    pub fn user_is_available() -> Self {
        Self::users().add_path("is-available")
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    pub fn login() -> Self {
        Self::new("auth").add_path("login")
    }

    pub fn profile() -> Self {
        Self::new("auth").add_path("profile")
    }

    // ── Categories ──────────────────────────────────────────────────────────

    pub fn categories() -> Self {
        Self::new("categories")
    }

    pub fn category_list(limit: u32) -> Self {
        Self::categories().limit(limit)
    }

    pub fn category(id: u64) -> Self {
        Self::categories().add_path(id.to_string())
    }

    pub fn products_for(category_id: u64, limit: u32, offset: u32) -> Self {
        Self::category(category_id)
            .add_path("products")
            .limit_offset(limit, offset)
    }

    // ── Files ───────────────────────────────────────────────────────────────

    pub fn files() -> Self {
        Self::new("files")
    }

    pub fn upload() -> Self {
        Self::files().add_path("upload")
    }

    pub fn file(name: &str) -> Self {
        Self::files().add_path(name)
    }
}
