//! Listening endpoints consumed by the accept loop.
//!
//! [`Listen`] is the blocking capability an [`AcceptLoop`](crate::net::accept::AcceptLoop)
//! needs: accept one connection, report the bound port, close. It is implemented for
//! [`std::net::TcpListener`] and, on unix, for `UnixListener`.

use std::fmt::Debug;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};

pub trait Listen: Send + 'static {
    /// The connected peer transport produced by an accept.
    type Conn: Send + 'static;
    /// The address reported for an accepted peer.
    type Addr: Debug + Send + Sync + 'static;

    /// Blocks until a peer connects.
    fn accept(&mut self) -> io::Result<(Self::Conn, Self::Addr)>;

    /// The port this endpoint is bound to, if it has one.
    fn local_port(&self) -> Option<u16> {
        None
    }

    /// Stops listening.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Listen for TcpListener {
    type Conn = TcpStream;
    type Addr = SocketAddr;

    fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self)
    }

    fn local_port(&self) -> Option<u16> {
        self.local_addr().ok().map(|addr| addr.port())
    }
}

#[cfg(unix)]
impl Listen for std::os::unix::net::UnixListener {
    type Conn = std::os::unix::net::UnixStream;
    type Addr = std::os::unix::net::SocketAddr;

    fn accept(&mut self) -> io::Result<(Self::Conn, Self::Addr)> {
        std::os::unix::net::UnixListener::accept(self)
    }
}
