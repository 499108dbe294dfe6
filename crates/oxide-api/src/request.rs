//! Request-side types: methods, captured parameters and a default request.

use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// HTTP request methods.
///
/// Unrecognized method strings parse to [`Method::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// CONNECT method
    Connect,
    /// DELETE method
    Delete,
    /// GET method
    Get,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// PATCH method
    Patch,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// TRACE method
    Trace,
    /// Anything else.
    Unknown,
}

impl Method {
    /// Every method, `Unknown` included.
    pub const ALL: [Self; 10] = [
        Self::Connect,
        Self::Delete,
        Self::Get,
        Self::Head,
        Self::Options,
        Self::Patch,
        Self::Post,
        Self::Put,
        Self::Trace,
        Self::Unknown,
    ];

    /// Parses a method from a string, ignoring case.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CONNECT" => Self::Connect,
            "DELETE" => Self::Delete,
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "TRACE" => Self::Trace,
            _ => Self::Unknown,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Trace => "TRACE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for Method {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered multimap of captured parameters.
///
/// Insertion order is kept and a key may carry several values, so
/// `/actions/:action/:action` captures two `action` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Creates new empty params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`, keeping earlier values.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Gets the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Gets every value for a key, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns true when the key has at least one value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Gets a parameter value or returns an error.
    pub fn require(&self, key: &str) -> Result<&str, String> {
        self.get(key)
            .ok_or_else(|| format!("Missing path parameter: {key}"))
    }

    /// Parses the first value of a parameter as a specific type.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns an iterator over all pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Serialized as `{"key": ["first", "second"]}` with keys in first-seen order.
impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in &self.entries {
            if !keys.contains(&k.as_str()) {
                keys.push(k);
            }
        }
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            map.serialize_entry(key, &self.get_all(key))?;
        }
        map.end()
    }
}

/// A request the router can dispatch on its own.
///
/// [`Router::dispatch`](crate::Router::dispatch) reads the method and path
/// and hands back the captured parameters before running the chain.
pub trait Routable {
    /// The request method.
    fn method(&self) -> Method;

    /// The request path, without query string.
    fn path(&self) -> &str;

    /// Stores the parameters captured from the path.
    fn set_params(&mut self, params: Params);
}

/// An in-process request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Path parameters extracted from URL patterns.
    pub params: Params,
    /// Query string parameters.
    pub query: Params,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Values shared between filters and the handler.
    pub context: HashMap<String, serde_json::Value>,
    /// Request body.
    pub body: Vec<u8>,
    /// Status set by filters or the handler, 0 while unset.
    pub status: u16,
    /// Headers to send back.
    pub response_headers: HashMap<String, String>,
}

impl Request {
    /// Creates a new request; a query string in `uri` is decoded into `query`.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Self::parse_query_string(query)),
            None => (uri, Params::new()),
        };
        Self {
            method,
            path,
            params: Params::new(),
            query,
            headers: HashMap::new(),
            context: HashMap::new(),
            body: Vec::new(),
            status: 0,
            response_headers: HashMap::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    /// Creates a POST request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::Post, uri)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key)
    }

    /// Sets a response header.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.response_headers.insert(key.into(), value.into());
    }

    /// Sets the response status unless one was already set.
    pub fn reply_status(&mut self, status: u16) {
        if self.status == 0 {
            self.status = status;
        }
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Parses query parameters from a query string.
    ///
    /// Repeated keys keep every value; a key without a value maps to `""`.
    pub fn parse_query_string(query: &str) -> Params {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (urlencoding_decode(key), urlencoding_decode(value))
            })
            .collect()
    }
}

impl Routable for Request {
    fn method(&self) -> Method {
        self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn set_params(&mut self, params: Params) {
        self.params = params;
    }
}

/// Simple URL decoding.
fn urlencoding_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(Method::parse("GET"), Method::Get);
        assert_eq!(Method::parse("post"), Method::Post);
        assert_eq!(Method::parse("INVALID"), Method::Unknown);
        assert_eq!("trace".parse::<Method>(), Ok(Method::Trace));
    }

    #[test]
    fn test_params_multimap() {
        let mut params = Params::new();
        params.insert("action", "walk");
        params.insert("id", "123");
        params.insert("action", "jump");

        assert_eq!(params.get("action"), Some("walk"));
        assert_eq!(params.get_all("action"), ["walk", "jump"]);
        assert_eq!(params.parse::<i64>("id"), Some(123));
        assert_eq!(params.get("missing"), None);
        assert!(params.require("missing").is_err());
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_params_serialize() {
        let params: Params = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({"a": ["1", "3"], "b": ["2"]}));
    }

    #[test]
    fn test_request_builder() {
        let req = Request::get("/users?page=1")
            .header("Content-Type", "application/json")
            .query_param("sort", "name");

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/users");
        assert_eq!(req.get_header("content-type"), Some("application/json"));
        assert_eq!(req.get_query("page"), Some("1"));
        assert_eq!(req.get_query("sort"), Some("name"));
    }

    #[test]
    fn test_query_string_parsing() {
        let query = Request::parse_query_string("name=John+Doe&tag=a&tag=b&flag&city=New%20York");
        assert_eq!(query.get("name"), Some("John Doe"));
        assert_eq!(query.get_all("tag"), ["a", "b"]);
        assert_eq!(query.get("flag"), Some(""));
        assert_eq!(query.get("city"), Some("New York"));
    }

    #[test]
    fn test_body_access() {
        let req = Request::post("/users").body(r#"{"name":"john","age":42}"#);
        assert_eq!(req.body_string().as_deref(), Some(r#"{"name":"john","age":42}"#));

        let value: serde_json::Value = req.json().unwrap();
        assert_eq!(value["name"], "john");
        assert_eq!(value["age"], 42);

        let broken = Request::post("/users").body(vec![0xff_u8, 0xfe]);
        assert!(broken.body_string().is_none());
        assert!(broken.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_reply_status_keeps_first() {
        let mut req = Request::get("/");
        req.reply_status(201);
        req.reply_status(500);
        assert_eq!(req.status, 201);
    }
}
