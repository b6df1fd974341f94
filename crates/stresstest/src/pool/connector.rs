use std::io;
use tokio::net::TcpStream;

/// A factory for connections to one fixed destination.
///
/// The pool calls [`Connector::connect`] whenever a checkout finds no idle
/// connection. Implementations must be cheap to share: a single connector is
/// owned by the pool and used from every dispatch task.
///
/// Closing a connection is dropping it.
pub trait Connector: Send + Sync + 'static {
    type Conn: Send + 'static;

    /// Dials the destination.
    fn connect(&self) -> impl Future<Output = io::Result<Self::Conn>> + Send;

    /// Reports whether an idle connection still looks usable.
    ///
    /// Only consulted when the pool is built with
    /// [`PoolConfig::validate_idle`](crate::PoolConfig::validate_idle).
    fn is_healthy(&self, _conn: &Self::Conn) -> bool {
        true
    }
}

/// Dials `host:port` over TCP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl Connector for TcpConnector {
    type Conn = TcpStream;

    async fn connect(&self) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        tracing::trace!(peer = ?stream.peer_addr().ok(), "dialed");
        Ok(stream)
    }

    /// Drains whatever the peer has sent without blocking. Running out of
    /// data means the peer is still there; EOF or an error means it has gone
    /// away. Unread bytes, such as a response nobody asked for, are
    /// discarded.
    fn is_healthy(&self, conn: &TcpStream) -> bool {
        let mut scratch = [0_u8; 512];
        loop {
            match conn.try_read(&mut scratch) {
                Ok(0) => return false,
                Ok(_) => {}
                Err(e) => return e.kind() == io::ErrorKind::WouldBlock,
            }
        }
    }
}
