pub mod client;
pub mod request;

pub use client::DirectoryClient;
pub use request::{DirectoryOp, DirectoryRequest, DirectoryResponse, PeerAddress, UserRecord};
