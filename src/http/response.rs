use bytes::{BufMut, Bytes, BytesMut};

use crate::http::range::ByteRange;

const HTTP_VERSION: &str = "HTTP/1.1";
const CONTENT_TYPE: &str = "text/html";

/// Target of the one resource this server knows.
pub const ROOT_TARGET: &str = "/";

/// Body sent inline with every 404.
pub const NOT_FOUND_BODY: &str =
    "<html><body><h1>404 Not Found</h1><p>There's nothing here.</p></body></html>";

/// HTTP status codes this server can answer with.
///
/// Sub-range responses deliberately keep `Ok`; there is no 206.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 416 Range Not Satisfiable, only sent with strict ranges enabled
    RangeNotSatisfiable,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use mapserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::RangeNotSatisfiable => 416,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::RangeNotSatisfiable => "Range Not Satisfiable",
        }
    }
}

/// Everything written before any file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub content_length: u64,
    /// Set on 416 only, as `bytes */<len>`.
    pub content_range: Option<String>,
    /// Body that travels inside the header frame (the 404 page).
    pub body_inline: Option<Bytes>,
}

impl ResponseHead {
    pub fn ok(content_length: u64) -> Self {
        Self {
            status: StatusCode::Ok,
            content_length,
            content_range: None,
            body_inline: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NotFound,
            content_length: NOT_FOUND_BODY.len() as u64,
            content_range: None,
            body_inline: Some(Bytes::from_static(NOT_FOUND_BODY.as_bytes())),
        }
    }

    pub fn range_not_satisfiable(file_len: u64) -> Self {
        Self {
            status: StatusCode::RangeNotSatisfiable,
            content_length: 0,
            content_range: Some(format!("bytes */{file_len}")),
            body_inline: None,
        }
    }

    /// Serializes the status line, headers, blank line and any inline body.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(128 + NOT_FOUND_BODY.len());

        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        buf.put_slice(status_line.as_bytes());

        buf.put_slice(format!("Content-Type: {CONTENT_TYPE}\r\n").as_bytes());
        buf.put_slice(format!("Content-Length: {}\r\n", self.content_length).as_bytes());

        if let Some(range) = &self.content_range {
            buf.put_slice(format!("Content-Range: {range}\r\n").as_bytes());
        }

        buf.put_slice(b"\r\n");

        if let Some(body) = &self.body_inline {
            buf.put_slice(body);
        }

        buf.freeze()
    }
}

/// A framed response plus the file span that has to follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framed {
    pub head: ResponseHead,
    /// `(start, end)` of the file bytes to send; `(0, 0)` when none follow.
    pub span: (u64, u64),
}

impl Framed {
    pub fn not_found() -> Self {
        Self {
            head: ResponseHead::not_found(),
            span: (0, 0),
        }
    }

    pub fn needs_body(&self) -> bool {
        self.span.0 != self.span.1
    }
}

/// Frames the response for `target`.
///
/// `file_len` is only called for the root target. For a sentinel or absent
/// range the whole file is announced; otherwise `end - start`.
pub fn frame<E>(
    target: &str,
    range: Option<ByteRange>,
    file_len: impl FnOnce() -> Result<u64, E>,
) -> Result<Framed, E> {
    if target != ROOT_TARGET {
        return Ok(Framed::not_found());
    }

    let len = file_len()?;
    let (start, end) = range.unwrap_or_default().span(len);

    Ok(Framed {
        head: ResponseHead::ok(end.saturating_sub(start)),
        span: (start, end),
    })
}
