//! TCP networking on top of the reader and writer engines.
//!
//! - [`listener`]: the [`Listen`](listener::Listen) capability for listening endpoints
//! - [`accept`]: [`AcceptLoop`](accept::AcceptLoop) for accepting connections
//! - [`socket`]: [`AsyncSocket`](socket::AsyncSocket) and [`DataSocket`](socket::DataSocket)
//!   pairing a reader and a writer on one stream
//!
//! # Example
//!
//! ```ignore
//! use relay::AsyncSocket;
//!
//! let socket = AsyncSocket::connect("127.0.0.1:8080")?;
//! socket.send("hello");
//! socket.close();
//! ```

pub mod accept;
pub mod listener;
pub mod socket;
