//! `Range` header resolution.
//!
//! Only the single-span form `bytes=<start>-<end>` is understood, and the end
//! offset is exclusive. Anything that does not parse degrades to the whole
//! file instead of producing an error.

/// A requested byte span, `[start, end)`.
///
/// `start == end` is the "whole resource" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// True when no real sub-span was asked for.
    pub fn is_whole(&self) -> bool {
        self.start == self.end
    }

    /// The span to actually send for a file of `file_len` bytes.
    pub fn span(&self, file_len: u64) -> (u64, u64) {
        if self.is_whole() {
            (0, file_len)
        } else {
            (self.start, self.end)
        }
    }

    /// Whether the span fits inside a file of `file_len` bytes.
    pub fn is_satisfiable(&self, file_len: u64) -> bool {
        self.is_whole() || (self.start < self.end && self.end <= file_len)
    }
}

/// Resolves the raw `Range` header value.
///
/// Returns `None` when no header was sent. A present but malformed header
/// resolves to `ByteRange { start: 0, end: 0 }`, i.e. the whole file. Both
/// offsets are required, so an open-ended `bytes=4-` is malformed too.
/// Offsets are not checked against the file here.
///
/// # Example
///
/// ```
/// # use mapserve::http::range::{resolve, ByteRange};
/// assert_eq!(resolve(Some(" bytes=2-5")), Some(ByteRange::new(2, 5)));
/// assert_eq!(resolve(Some("items=2-5")), Some(ByteRange::new(0, 0)));
/// assert_eq!(resolve(Some("bytes=4-")), Some(ByteRange::new(0, 0)));
/// assert_eq!(resolve(None), None);
/// ```
pub fn resolve(header: Option<&str>) -> Option<ByteRange> {
    let value = header?;
    Some(parse_bytes_spec(value).unwrap_or_default())
}

fn parse_bytes_spec(value: &str) -> Option<ByteRange> {
    let (_, spec) = value.split_once("bytes=")?;

    let (start, rest) = take_offset(spec);
    let start = start?;

    let rest = rest.strip_prefix('-')?;
    let (end, _) = take_offset(rest);
    let end = end?;

    Some(ByteRange { start, end })
}

fn leading_offset(s: &str) -> &str {
    let len = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    &s[..len]
}

/// Reads a decimal offset off the front of `s`. Fractions round up.
fn take_offset(s: &str) -> (Option<u64>, &str) {
    let token = leading_offset(s);
    let rest = &s[token.len()..];

    let well_formed = !token.is_empty()
        && !token.ends_with('.')
        && token.matches('.').count() <= 1;

    if !well_formed {
        return (None, rest);
    }

    let offset = token.parse::<f64>().ok().map(|v| v.ceil() as u64);
    (offset, rest)
}
