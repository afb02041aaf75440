/// A request as read off the wire.
///
/// Nothing here is validated: the method may be anything, and a short request
/// line simply leaves the missing fields empty. Only `target` and the `Range`
/// header are ever consulted when building the response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method token (e.g. "GET")
    pub method: String,
    /// The request target (e.g. "/")
    pub target: String,
    /// HTTP version token (typically "HTTP/1.1")
    pub version: String,
    /// Header lines in arrival order. Keys are kept exactly as received and
    /// values are not trimmed; duplicate keys coexist.
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills method, target and version from the first three whitespace
    /// separated tokens of `line`.
    pub fn set_request_line(&mut self, line: &str) {
        let mut parts = line.split_whitespace();
        self.method = parts.next().unwrap_or_default().to_string();
        self.target = parts.next().unwrap_or_default().to_string();
        self.version = parts.next().unwrap_or_default().to_string();
    }

    pub fn push_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.push((key.into(), value.into()));
    }

    /// Looks up a header by exact, case-sensitive name.
    ///
    /// When the same name was sent more than once the first occurrence wins.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn range(&self) -> Option<&str> {
        self.header(RANGE_HEADER)
    }
}

/// Name of the only request header the server interprets.
pub const RANGE_HEADER: &str = "Range";
