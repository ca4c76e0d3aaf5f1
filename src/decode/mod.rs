//! Response decoding and request-body encoding.
//!
//! Every DTO shares one naming contract: wire keys are snake_case, Rust-side
//! serde names are camelCase (`#[serde(rename_all = "camelCase")]`). The
//! [`JsonDecoder`] rewrites incoming keys from snake_case before handing the
//! document to serde, and [`JsonEncoder`] applies the inverse to outgoing
//! payloads, so no individual type has to spell out wire names.
//!
//! ## Core types
//!
//! - [`KeyStrategy`]: which key rewrite to apply.
//! - [`JsonDecoder`]: bytes to typed value.
//! - [`JsonEncoder`]: typed value to bytes.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// A response body could not be turned into the requested type.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// A request payload could not be serialized.
#[derive(Debug, Error)]
#[error("failed to encode payload: {0}")]
pub struct EncodeError(#[from] pub serde_json::Error);

/// How object keys are rewritten on their way through the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStrategy {
    /// Keys are passed through untouched.
    #[default]
    UseDefaultKeys,
    /// `first_name` becomes `firstName`.
    ConvertFromSnakeCase,
    /// `firstName` becomes `first_name`.
    ConvertToSnakeCase,
}

impl KeyStrategy {
    fn apply(self, key: &str) -> String {
        match self {
            Self::UseDefaultKeys => key.to_owned(),
            Self::ConvertFromSnakeCase => convert_from_snake_case(key),
            Self::ConvertToSnakeCase => convert_to_snake_case(key),
        }
    }

    /// Rewrites every object key in `value`, recursing through arrays.
    fn rewrite(self, value: Value) -> Value {
        if self == Self::UseDefaultKeys {
            return value;
        }
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (self.apply(&k), self.rewrite(v)))
                    .collect::<Map<String, Value>>(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.rewrite(v)).collect())
            }
            other => other,
        }
    }
}

/// Converts a snake_case key to camelCase.
///
/// Leading and trailing underscores are preserved. A key with no inner
/// underscore is returned unchanged, so keys that are already camelCase pass
/// through.
///
/// ```
/// use fakestore::decode::convert_from_snake_case;
///
/// assert_eq!(convert_from_snake_case("category_id"), "categoryId");
/// assert_eq!(convert_from_snake_case("_private_key_"), "_privateKey_");
/// assert_eq!(convert_from_snake_case("creationAt"), "creationAt");
/// ```
pub fn convert_from_snake_case(key: &str) -> String {
    let core = key.trim_matches('_');
    if core.is_empty() {
        return key.to_owned();
    }
    let leading = &key[..key.len() - key.trim_start_matches('_').len()];
    let trailing = &key[key.trim_end_matches('_').len()..];

    let mut words = core.split('_').filter(|w| !w.is_empty());
    let Some(first) = words.next() else {
        return key.to_owned();
    };
    let rest: Vec<&str> = words.collect();
    if rest.is_empty() {
        return key.to_owned();
    }

    let mut out = String::with_capacity(key.len());
    out.push_str(leading);
    out.push_str(&first.to_lowercase());
    for word in rest {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out.push_str(trailing);
    out
}

/// Converts a camelCase key to snake_case.
///
/// A run of capitals is one word; its last capital starts the next word
/// when a lower-case letter follows.
///
/// ```
/// use fakestore::decode::convert_to_snake_case;
///
/// assert_eq!(convert_to_snake_case("categoryId"), "category_id");
/// assert_eq!(convert_to_snake_case("imageURL"), "image_url");
/// assert_eq!(convert_to_snake_case("myURLProperty"), "my_url_property");
/// assert_eq!(convert_to_snake_case("title"), "title");
/// ```
pub fn convert_to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_uppercase() {
            out.push(ch);
            continue;
        }
        let starts_word = i > 0
            && match (chars[i - 1], chars.get(i + 1)) {
                (prev, _) if prev.is_lowercase() || prev.is_ascii_digit() => true,
                (prev, Some(next)) => prev.is_uppercase() && next.is_lowercase(),
                _ => false,
            };
        if starts_word && !out.ends_with('_') {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Decodes JSON response bodies with a fixed key strategy.
///
/// # Examples
///
/// ```
/// use fakestore::decode::JsonDecoder;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Tokens {
///     access_token: String,
/// }
///
/// let tokens: Tokens = JsonDecoder::default()
///     .decode(br#"{"access_token":"abc"}"#)
///     .unwrap();
/// assert_eq!(tokens.access_token, "abc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonDecoder {
    keys: KeyStrategy,
}

impl JsonDecoder {
    pub fn new(keys: KeyStrategy) -> Self {
        Self { keys }
    }

    pub fn key_strategy(&self) -> KeyStrategy {
        self.keys
    }

    /// Decodes `bytes` into `T`. Pure: no I/O, no shared state.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(serde_json::from_value(self.keys.rewrite(value))?)
    }
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new(KeyStrategy::ConvertFromSnakeCase)
    }
}

/// Encodes request payloads with a fixed key strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonEncoder {
    keys: KeyStrategy,
}

impl JsonEncoder {
    pub fn new(keys: KeyStrategy) -> Self {
        Self { keys }
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Bytes, EncodeError> {
        let value = self.keys.rewrite(serde_json::to_value(value)?);
        Ok(Bytes::from(serde_json::to_vec(&value)?))
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new(KeyStrategy::ConvertToSnakeCase)
    }
}

/// Passes the body through as-is.
pub fn decode_bytes(bytes: &[u8]) -> Result<Bytes, DecodeError> {
    Ok(Bytes::copy_from_slice(bytes))
}

/// Interprets the body as UTF-8 text.
pub fn decode_text(bytes: &[u8]) -> Result<String, DecodeError> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}
