//! Case-insensitive request header normalization

use std::collections::HashMap;
use std::collections::hash_map;

/// Header names used by the webhook platform, lowercase
pub mod names {
    /// Signature token, `t=<ms>,v1=<hex>`
    pub const SIGNATURE: &str = "x-signature";

    /// Event timestamp in milliseconds
    pub const TIMESTAMP: &str = "x-timestamp";

    /// Event identifier
    pub const EVENT_ID: &str = "x-event-id";

    /// Delivery identifier
    pub const DELIVERY_ID: &str = "x-delivery-id";

    pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
    pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
    pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
}

/// A raw header value as handed over by an HTTP framework.
///
/// Some frameworks expose every header as a list; only the first element is
/// meaningful here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    fn into_first(self) -> Option<String> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.into_iter().next(),
        }
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&String> for HeaderValue {
    fn from(value: &String) -> Self {
        Self::Single(value.clone())
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<&Vec<String>> for HeaderValue {
    fn from(values: &Vec<String>) -> Self {
        Self::Multiple(values.clone())
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for HeaderValue {
    fn from(values: &[&str]) -> Self {
        Self::Multiple(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValue {
    fn from(values: [&str; N]) -> Self {
        Self::Multiple(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Canonical header map: lowercase names, one string per name.
///
/// Built once per request by [`WebhookHeaders::normalize`]; every lookup
/// afterwards is a plain map access. When two input names differ only by
/// case, the one yielded last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
    inner: HashMap<String, String>,
}

impl WebhookHeaders {
    /// Lowercase every name and reduce sequence values to their first element.
    /// Empty sequences are dropped.
    ///
    /// Names that collide after lowercasing keep the value yielded last, so
    /// the winner follows the iteration order of `headers`. Pass an ordered
    /// collection when the input may carry the same name twice.
    pub fn normalize<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<HeaderValue>,
    {
        let inner = headers
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .into()
                    .into_first()
                    .map(|value| (name.as_ref().to_ascii_lowercase(), value))
            })
            .collect();
        Self { inner }
    }

    /// Look up a header by any casing of its name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(name)
            .or_else(|| self.inner.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats an empty value as absent
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn signature(&self) -> Option<&str> {
        self.get_non_empty(names::SIGNATURE)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get_non_empty(names::TIMESTAMP)
    }

    pub fn event_id(&self) -> Option<&str> {
        self.get(names::EVENT_ID)
    }

    pub fn delivery_id(&self) -> Option<&str> {
        self.get(names::DELIVERY_ID)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.inner.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for WebhookHeaders
where
    K: AsRef<str>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::normalize(iter)
    }
}

impl<'a> IntoIterator for &'a WebhookHeaders {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
