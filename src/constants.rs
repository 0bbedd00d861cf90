// src/constants.rs

/// Operation tags, sent verbatim as the first token of every request.
pub const OP_REGISTER: &str = "REGISTER";
pub const OP_UNREGISTER: &str = "UNREGISTER";
pub const OP_CONNECT: &str = "CONNECT";
pub const OP_DISCONNECT: &str = "DISCONNECT";
pub const OP_PUBLISH: &str = "PUBLISH";
pub const OP_DELETE: &str = "DELETE";
pub const OP_LIST_USERS: &str = "LIST USERS";
pub const OP_LIST_CONTENT: &str = "LIST CONTENT";
pub const OP_GET_FILE: &str = "GET FILE";

pub const STATUS_OK: u8 = 0;
pub const STATUS_FILE_NOT_FOUND: u8 = 1;
pub const STATUS_PEER_ERROR: u8 = 2;

pub const TOKEN_TERMINATOR: u8 = 0x00;
/// Longest token accepted, terminator included (the directory server's buffer).
pub const MAX_TOKEN_LEN: usize = 1024;

pub const DEFAULT_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_MAX_PEER_CONNECTIONS: usize = 64;
pub const DEFAULT_DIRECTORY_HOST: &str = "127.0.0.1";
pub const DEFAULT_DIRECTORY_PORT: u16 = 8888;
pub const DEFAULT_PEER_BIND_ADDRESS: &str = "0.0.0.0";
