//! HTTP protocol implementation.
//!
//! This module answers one request per connection with the bytes of a single
//! file, optionally restricted to a byte range.
//!
//! # Architecture
//!
//! - **`session`**: Per-connection state machine driving everything below
//! - **`parser`**: Incremental `\r`-terminated line reader for the request head
//! - **`request`**: The request line and headers as received
//! - **`range`**: Resolves the `Range` header into a byte span
//! - **`response`**: Frames the status line and headers
//! - **`queue`**: Ordered, single-flight outbound chunk queue
//! - **`source`**: Memory-maps spans of the served file
//!
//! # Session State Machine
//!
//! ```text
//!        ┌─────────────────────┐
//!        │ AwaitingRequestLine │ ← First line: method, target, version
//!        └──────────┬──────────┘
//!                   │ Line read
//!                   ▼
//!        ┌─────────────────────┐
//!        │   AwaitingHeaders   │ ← One header per line
//!        └──────────┬──────────┘
//!                   │ Empty line
//!                   ▼
//!        ┌─────────────────────┐
//!        │     Responding      │ ← Head chunk, then the mapped file span
//!        └──────────┬──────────┘
//!                   │ Queue drained or peer gone
//!                   ▼
//!        ┌─────────────────────┐
//!        │       Closed        │
//!        └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mapserve::http::session::{Session, SessionConfig};
//! use mapserve::http::source::FileSource;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let config = Arc::new(SessionConfig::new(FileSource::new("index.html")));
//!
//!     loop {
//!         let (socket, addr) = listener.accept().await?;
//!         let session = Session::new(socket, config.clone(), addr.to_string());
//!         tokio::spawn(session.run());
//!     }
//! }
//! ```

pub mod parser;
pub mod queue;
pub mod range;
pub mod request;
pub mod response;
pub mod session;
pub mod source;
