use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound on a single request or header line.
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Upper bound on the whole request head, terminators included.
pub const MAX_HEAD_LEN: usize = 64 * 1024;

const READ_CHUNK: usize = 1024;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The client sent more than [`MAX_LINE_LEN`] bytes without a `\r`.
    #[error("request line exceeds {} bytes", MAX_LINE_LEN)]
    LineTooLong,
    /// The request head as a whole grew past [`MAX_HEAD_LEN`] bytes.
    #[error("request head exceeds {} bytes", MAX_HEAD_LEN)]
    HeadTooLarge,
}

/// Splits a header line at its first `:`.
///
/// Neither side is trimmed, so `Range: bytes=0-1` yields the value
/// `" bytes=0-1"`. A line without a colon becomes a key with an empty value.
pub fn parse_header_line(line: &str) -> (&str, &str) {
    line.split_once(':').unwrap_or((line, ""))
}

/// Incremental line reader for the request head.
///
/// Lines end at `\r`; a `\n` directly after it is dropped, even when it
/// arrives in a later read.
pub struct RequestReader<R> {
    inner: R,
    buffer: BytesMut,
    skip_lf: bool,
    /// Bytes of the head already handed out as lines.
    consumed: usize,
}

impl<R: AsyncRead + Unpin> RequestReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(4096),
            skip_lf: false,
            consumed: 0,
        }
    }

    /// Returns the next line without its terminator, or `None` once the peer
    /// has closed the connection before completing one.
    ///
    /// Fails once a single line passes [`MAX_LINE_LEN`] or the head read so
    /// far passes [`MAX_HEAD_LEN`].
    pub async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        loop {
            if let Some(line) = self.take_line() {
                if self.consumed > MAX_HEAD_LEN {
                    return Err(ParseError::HeadTooLarge.into());
                }
                return Ok(Some(line));
            }

            if self.buffer.len() > MAX_LINE_LEN {
                return Err(ParseError::LineTooLong.into());
            }

            if self.consumed + self.buffer.len() > MAX_HEAD_LEN {
                return Err(ParseError::HeadTooLarge.into());
            }

            self.buffer.reserve(READ_CHUNK);
            let n = self.inner.read_buf(&mut self.buffer).await?;

            if n == 0 {
                return Ok(None);
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        if self.skip_lf && !self.buffer.is_empty() {
            if self.buffer[0] == b'\n' {
                self.buffer.advance(1);
                self.consumed += 1;
            }
            self.skip_lf = false;
        }

        let end = self.buffer.iter().position(|&b| b == b'\r')?;
        let line = self.buffer.split_to(end);
        self.buffer.advance(1);
        self.skip_lf = true;
        self.consumed += end + 1;

        Some(String::from_utf8_lossy(&line).into_owned())
    }
}
