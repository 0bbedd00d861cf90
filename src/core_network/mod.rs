pub mod download;
pub mod get_file;
pub mod network;

pub use download::{FileTransfer, FileTransferClient};
pub use network::{PeerFileServer, PeerServerOptions};
