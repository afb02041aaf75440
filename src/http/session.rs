use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};

use crate::config::Config;
use crate::http::parser::{RequestReader, parse_header_line};
use crate::http::queue::{Chunk, DrainOutcome, OutboundQueue, is_disconnect};
use crate::http::range::{self, ByteRange};
use crate::http::request::Request;
use crate::http::response::{self, Framed, ResponseHead};
use crate::http::source::{FileSource, MappedRegion};

/// Settings shared by every session of one server.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub source: FileSource,
    pub strict_ranges: bool,
    pub header_timeout: Duration,
}

impl SessionConfig {
    pub fn new(source: FileSource) -> Self {
        Self {
            source,
            strict_ranges: false,
            header_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            source: FileSource::new(cfg.file.path.clone()),
            strict_ranges: cfg.file.strict_ranges,
            header_timeout: cfg.server.header_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingRequestLine,
    AwaitingHeaders,
    Responding,
    Closed,
}

/// One accepted connection, from the request line to the last written byte.
///
/// There is no keep-alive: a session answers exactly one request.
pub struct Session<S> {
    reader: RequestReader<ReadHalf<S>>,
    queue: OutboundQueue<WriteHalf<S>>,
    request: Request,
    state: SessionState,
    config: Arc<SessionConfig>,
    /// The mapping behind the file chunk currently queued, if any.
    region: Option<MappedRegion>,
    peer: String,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<SessionConfig>, peer: impl Into<String>) -> Self {
        let (rd, wr) = tokio::io::split(stream);
        Self {
            reader: RequestReader::new(rd),
            queue: OutboundQueue::new(wr),
            request: Request::new(),
            state: SessionState::AwaitingRequestLine,
            config,
            region: None,
            peer: peer.into(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match self.state {
                SessionState::AwaitingRequestLine => match self.next_line().await? {
                    Some(line) => {
                        self.request.set_request_line(&line);
                        tracing::debug!(
                            peer = %self.peer,
                            method = %self.request.method,
                            target = %self.request.target,
                            "Request line"
                        );
                        self.state = SessionState::AwaitingHeaders;
                    }
                    None => self.state = SessionState::Closed,
                },

                SessionState::AwaitingHeaders => match self.next_line().await? {
                    Some(line) if line.is_empty() => {
                        self.state = SessionState::Responding;
                    }
                    Some(line) => {
                        let (key, value) = parse_header_line(&line);
                        tracing::trace!(peer = %self.peer, %key, %value, "Header");
                        self.request.push_header(key, value);
                    }
                    None => self.state = SessionState::Closed,
                },

                SessionState::Responding => {
                    self.respond().await;
                    self.state = SessionState::Closed;
                }

                SessionState::Closed => break,
            }
        }

        self.queue.close().await;
        self.region = None;

        Ok(())
    }

    /// Reads one head line, treating a header timeout or a peer reset like a
    /// hang-up.
    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        match tokio::time::timeout(self.config.header_timeout, self.reader.next_line()).await {
            Ok(Err(e)) if e.downcast_ref::<io::Error>().is_some_and(is_disconnect) => {
                tracing::debug!(peer = %self.peer, error = %e, "Peer closed while sending headers");
                Ok(None)
            }
            Ok(line) => line,
            Err(_) => {
                tracing::info!(peer = %self.peer, "Timed out waiting for request headers");
                Ok(None)
            }
        }
    }

    async fn respond(&mut self) {
        let framed = self.plan();
        let status = framed.head.status;
        let header = Chunk::Header(framed.head.encode());

        self.queue.push(header);
        if let Some(region) = &self.region {
            self.queue.push(Chunk::File(region.clone()));
        }

        let outcome = self.queue.drain().await;

        match outcome {
            DrainOutcome::Flushed => tracing::info!(
                peer = %self.peer,
                target = %self.request.target,
                status = status.as_u16(),
                bytes = self.queue.bytes_written(),
                "Response sent"
            ),
            DrainOutcome::PeerClosed => tracing::info!(
                peer = %self.peer,
                target = %self.request.target,
                bytes = self.queue.bytes_written(),
                "Peer closed before response completed"
            ),
            DrainOutcome::Failed(kind) => tracing::warn!(
                peer = %self.peer,
                target = %self.request.target,
                error = ?kind,
                "Response aborted"
            ),
        }
    }

    /// Decides what to send and, for a file body, maps it.
    ///
    /// The mapping is made before anything is queued so that a failure can
    /// still be answered with a clean 404.
    fn plan(&mut self) -> Framed {
        let range = range::resolve(self.request.range());
        let source = &self.config.source;

        let framed = match response::frame(&self.request.target, range, || source.len()) {
            Ok(framed) => framed,
            Err(e) => {
                tracing::warn!(
                    peer = %self.peer,
                    file = %source.path().display(),
                    error = %e,
                    "Served file unavailable"
                );
                return Framed::not_found();
            }
        };

        if !framed.needs_body() {
            return framed;
        }

        if self.config.strict_ranges {
            if let Some(rejected) = self.reject_unsatisfiable(range) {
                return rejected;
            }
        }

        let (start, end) = framed.span;
        match source.map(start, end) {
            Ok(region) => {
                tracing::debug!(peer = %self.peer, start, end, "Mapped file span");
                self.region = Some(region);
                framed
            }
            Err(e) => {
                tracing::warn!(peer = %self.peer, start, end, error = %e, "Failed to map file span");
                Framed::not_found()
            }
        }
    }

    fn reject_unsatisfiable(&self, range: Option<ByteRange>) -> Option<Framed> {
        let range = range?;
        let file_len = self.config.source.len().ok()?;

        if range.is_satisfiable(file_len) {
            return None;
        }

        tracing::info!(
            peer = %self.peer,
            start = range.start,
            end = range.end,
            file_len,
            "Range not satisfiable"
        );

        Some(Framed {
            head: ResponseHead::range_not_satisfiable(file_len),
            span: (0, 0),
        })
    }
}
