//! mapserve - single-file HTTP/1.1 responder
//!
//! Serves one configured file for `/`, honoring single-span `Range`
//! requests, by streaming a memory-mapped view of the file.

pub mod config;
pub mod http;
pub mod server;
