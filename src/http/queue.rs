//! Ordered outbound byte queue for one connection.
//!
//! At most one write is in flight at a time: a chunk leaves the queue only
//! after its bytes have been handed to the transport in full, so bytes reach
//! the peer in the order they were pushed.

use bytes::Bytes;
use std::collections::VecDeque;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::source::MappedRegion;

/// One unit of outbound data. Each variant owns or co-owns its memory.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Response head, including any inline body.
    Header(Bytes),
    /// A span of the served file, written straight from the mapping.
    File(MappedRegion),
}

impl Chunk {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Chunk::Header(bytes) => bytes,
            Chunk::File(region) => region.as_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How the last drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every queued chunk was written.
    Flushed,
    /// The peer went away; the queue is closed.
    PeerClosed,
    /// Any other transport error; the queue is closed.
    Failed(io::ErrorKind),
}

/// Errors that mean the peer hung up rather than something being wrong.
pub fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::WriteZero
    )
}

pub struct OutboundQueue<W> {
    writer: W,
    pending: VecDeque<Chunk>,
    open: bool,
    chunks_written: usize,
    bytes_written: u64,
}

impl<W: AsyncWrite + Unpin> OutboundQueue<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pending: VecDeque::new(),
            open: true,
            chunks_written: 0,
            bytes_written: 0,
        }
    }

    /// Appends `chunk` to the tail. Returns `false`, dropping the chunk, once
    /// the queue has been closed.
    pub fn push(&mut self, chunk: Chunk) -> bool {
        if !self.open {
            return false;
        }
        self.pending.push_back(chunk);
        true
    }

    /// Pushes `chunk` and drains everything queued.
    pub async fn send(&mut self, chunk: Chunk) -> DrainOutcome {
        if !self.push(chunk) {
            return DrainOutcome::PeerClosed;
        }
        self.drain().await
    }

    /// Writes queued chunks head first, one at a time.
    ///
    /// On a write error the transport is shut down and whatever is still
    /// queued is dropped.
    pub async fn drain(&mut self) -> DrainOutcome {
        if !self.open {
            return DrainOutcome::PeerClosed;
        }

        while let Some(chunk) = self.pending.front() {
            let len = chunk.len();

            if let Err(e) = self.writer.write_all(chunk.as_bytes()).await {
                let outcome = if is_disconnect(&e) {
                    tracing::debug!(error = %e, dropped = self.pending.len(), "Peer closed during write");
                    DrainOutcome::PeerClosed
                } else {
                    tracing::warn!(error = %e, dropped = self.pending.len(), "Write failed, closing connection");
                    DrainOutcome::Failed(e.kind())
                };
                self.close().await;
                return outcome;
            }

            self.pending.pop_front();
            self.chunks_written += 1;
            self.bytes_written += len as u64;
            tracing::trace!(bytes = len, "Sent chunk");
        }

        if let Err(e) = self.writer.flush().await {
            tracing::debug!(error = %e, "Flush failed");
            self.close().await;
            return if is_disconnect(&e) {
                DrainOutcome::PeerClosed
            } else {
                DrainOutcome::Failed(e.kind())
            };
        }

        DrainOutcome::Flushed
    }

    /// Shuts down the write side and discards anything still pending.
    pub async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.pending.clear();
        let _ = self.writer.shutdown().await;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
