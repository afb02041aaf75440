use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::info;

use crate::config::Config;
use crate::http::session::{Session, SessionConfig};

const BACKLOG: u32 = 1024;

/// Pause after a failed accept, so a persistent error such as `EMFILE`
/// does not spin the loop.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Source of inbound connections.
pub trait Accept {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn accept(&mut self) -> impl Future<Output = io::Result<(Self::Stream, SocketAddr)>> + Send;
}

impl Accept for TcpListener {
    type Stream = TcpStream;

    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let addr = cfg.server.socket_addr();
    let listener = bind(addr)?;
    info!("Listening on {}, serving {}", addr, cfg.file.path.display());

    serve(listener, Arc::new(SessionConfig::from(cfg))).await
}

/// Binds `addr` with `SO_REUSEADDR` set.
pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG)
}

/// Accepts connections forever, one session task each.
pub async fn serve<A: Accept>(mut acceptor: A, config: Arc<SessionConfig>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match acceptor.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let config = config.clone();
        tokio::spawn(async move {
            let session = Session::new(socket, config, peer.to_string());
            if let Err(e) = session.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
