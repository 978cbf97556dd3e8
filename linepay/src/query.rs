//! Query-string serialization and path merging.
//!
//! Parameter types describe their wire form by implementing [`QueryParams`].
//! Each field is written with an explicit rule:
//!
//! - [`QueryWriter::append`]: always present, even when empty
//! - [`QueryWriter::append_nonempty`]: omitted when the value is empty
//!   (empty string, zero, `false`, `None`)
//! - [`QueryWriter::append_each`]: one `name=value` pair per element
//!
//! The emitted string is sorted by key, so the same parameters always encode
//! to the same bytes. That string is used both on the URL and in the signed
//! message.
//!
//! ```
//! use linepay::query::{merge_query, QueryParams, QueryWriter};
//!
//! struct Search {
//!     order_id: String,
//!     fields: String,
//! }
//!
//! impl QueryParams for Search {
//!     fn write_query(&self, query: &mut QueryWriter) {
//!         query
//!             .append_nonempty("orderId", &self.order_id)
//!             .append_nonempty("fields", &self.fields);
//!     }
//! }
//!
//! let search = Search { order_id: "A-1".into(), fields: String::new() };
//! assert_eq!(merge_query("v3/payments", &search).unwrap(), "v3/payments?orderId=A-1");
//! ```

use std::fmt;

use url::form_urlencoded;

use crate::error::EncodingError;

/// A type that can be serialized into URL query parameters.
pub trait QueryParams {
    /// Writes this value's fields into `query`.
    fn write_query(&self, query: &mut QueryWriter);
}

impl<T: QueryParams + ?Sized> QueryParams for &T {
    fn write_query(&self, query: &mut QueryWriter) {
        (**self).write_query(query);
    }
}

/// No parameters.
impl QueryParams for () {
    fn write_query(&self, _query: &mut QueryWriter) {}
}

/// A scalar that can appear as a query parameter value.
pub trait QueryValue {
    /// Returns the textual wire form of the value.
    fn to_query_value(&self) -> String;

    /// Returns `true` if the value counts as empty for
    /// [`QueryWriter::append_nonempty`].
    fn is_empty_value(&self) -> bool;
}

impl QueryValue for str {
    fn to_query_value(&self) -> String {
        self.to_owned()
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl QueryValue for String {
    fn to_query_value(&self) -> String {
        self.clone()
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl QueryValue for bool {
    fn to_query_value(&self) -> String {
        self.to_string()
    }

    fn is_empty_value(&self) -> bool {
        !*self
    }
}

macro_rules! impl_query_value_int {
    ($($ty:ty),*) => {
        $(
            impl QueryValue for $ty {
                fn to_query_value(&self) -> String {
                    self.to_string()
                }

                fn is_empty_value(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

impl_query_value_int!(i32, i64, u32, u64);

impl<T: QueryValue> QueryValue for Option<T> {
    fn to_query_value(&self) -> String {
        self.as_ref().map(T::to_query_value).unwrap_or_default()
    }

    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn to_query_value(&self) -> String {
        (**self).to_query_value()
    }

    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

/// Collects query parameters for a [`QueryParams`] implementation.
#[derive(Debug, Default)]
pub struct QueryWriter {
    pairs: Vec<(&'static str, String)>,
}

impl QueryWriter {
    /// Appends `name=value`, even when the value is empty.
    pub fn append<V: QueryValue + ?Sized>(&mut self, name: &'static str, value: &V) -> &mut Self {
        self.pairs.push((name, value.to_query_value()));
        self
    }

    /// Appends `name=value` unless the value is empty.
    pub fn append_nonempty<V: QueryValue + ?Sized>(
        &mut self,
        name: &'static str,
        value: &V,
    ) -> &mut Self {
        if !value.is_empty_value() {
            self.append(name, value);
        }
        self
    }

    /// Appends one `name=value` pair per element. Nothing is written for an
    /// empty sequence.
    pub fn append_each<I>(&mut self, name: &'static str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: QueryValue,
    {
        for value in values {
            self.append(name, &value);
        }
        self
    }

    fn finish(mut self) -> QueryString {
        // Stable: repeated keys keep their insertion order.
        self.pairs.sort_by_key(|(name, _)| *name);
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        QueryString(encoded)
    }
}

/// An encoded query string, without the leading `?`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString(String);

impl QueryString {
    /// Encodes `params`.
    #[must_use]
    pub fn from_params<Q: QueryParams + ?Sized>(params: &Q) -> Self {
        let mut writer = QueryWriter::default();
        params.write_query(&mut writer);
        writer.finish()
    }

    /// Returns the encoded string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no parameters were written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a request path and strips a single leading `/`.
///
/// The result always resolves below the endpoint base, and the URL parser
/// leaves it byte-for-byte unchanged, so the signed path is the one sent.
///
/// # Errors
///
/// Returns [`EncodingError::InvalidPath`] for absolute URLs, network-path
/// references, dot segments (plain or percent-encoded), embedded queries or
/// fragments, backslashes, malformed percent escapes, and characters the URL
/// serializer would rewrite (whitespace, control and non-ASCII characters
/// among them).
pub fn normalize_path(path: &str) -> Result<&str, EncodingError> {
    let invalid = |reason| EncodingError::InvalidPath {
        path: path.to_owned(),
        reason,
    };
    let relative = path.strip_prefix('/').unwrap_or(path);
    if relative.starts_with('/') {
        return Err(invalid("network-path references are not allowed"));
    }
    if url::Url::parse(relative).is_ok() {
        return Err(invalid("absolute URLs are not allowed"));
    }
    if relative.contains(['?', '#']) {
        return Err(invalid("queries and fragments must not be embedded in the path"));
    }
    if relative.contains('\\') {
        return Err(invalid("backslashes are not allowed"));
    }
    if let Some(c) = relative.chars().find(|&c| !is_path_char(c)) {
        return Err(if c.is_whitespace() || c.is_control() {
            invalid("whitespace and control characters are not allowed")
        } else {
            invalid("characters outside the URL path set are not allowed")
        });
    }
    let bytes = relative.as_bytes();
    for (i, _) in relative.match_indices('%') {
        match bytes.get(i + 1..i + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                if *hi == b'2' && lo.eq_ignore_ascii_case(&b'e') {
                    return Err(invalid("percent-encoded dots are not allowed"));
                }
            }
            _ => return Err(invalid("malformed percent escape")),
        }
    }
    if relative.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(invalid("dot segments are not allowed"));
    }
    Ok(relative)
}

/// Characters the URL parser copies into a path without rewriting them.
const fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ','
                | ';' | '=' | ':' | '@' | '/' | '%'
        )
}

/// Merges `params` into `path` as a query string.
///
/// An empty parameter set returns the path unchanged, without a trailing `?`.
///
/// # Errors
///
/// Returns [`EncodingError::InvalidPath`] if `path` is not a valid relative
/// reference (see [`normalize_path`]).
pub fn merge_query<Q: QueryParams + ?Sized>(path: &str, params: &Q) -> Result<String, EncodingError> {
    let path = normalize_path(path)?;
    let query = QueryString::from_params(params);
    if query.is_empty() {
        Ok(path.to_owned())
    } else {
        Ok(format!("{path}?{query}"))
    }
}
