//! Client side of a peer-assisted file-sharing network.
//!
//! A directory server tracks registered and online users; each online user
//! also runs a small file server that other peers fetch from directly.

pub mod config;
pub mod constants;
pub mod core_directory;
pub mod core_network;
pub mod core_protocol;
pub mod helpers;
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::{ClientConfig, Config};
pub use core_directory::{DirectoryClient, PeerAddress, UserRecord};
pub use core_network::{FileTransfer, FileTransferClient, PeerFileServer, PeerServerOptions};
pub use core_protocol::error::{AppError, ClientError, ClientResult, CodecError, TransportError};
pub use session::Session;
