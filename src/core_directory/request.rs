use crate::constants::*;
use crate::core_protocol::error::{AppError, ClientError, TransportError};

/// Operations understood by the directory server.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum DirectoryOp {
    Register,
    Unregister,
    Connect,
    Disconnect,
    Publish,
    Delete,
    ListUsers,
    ListContent,
}

impl DirectoryOp {
    /// The literal first token of the request.
    pub fn tag(self) -> &'static str {
        match self {
            DirectoryOp::Register => OP_REGISTER,
            DirectoryOp::Unregister => OP_UNREGISTER,
            DirectoryOp::Connect => OP_CONNECT,
            DirectoryOp::Disconnect => OP_DISCONNECT,
            DirectoryOp::Publish => OP_PUBLISH,
            DirectoryOp::Delete => OP_DELETE,
            DirectoryOp::ListUsers => OP_LIST_USERS,
            DirectoryOp::ListContent => OP_LIST_CONTENT,
        }
    }

    pub fn from_tag(tag: &str) -> Option<DirectoryOp> {
        match tag {
            OP_REGISTER => Some(DirectoryOp::Register),
            OP_UNREGISTER => Some(DirectoryOp::Unregister),
            OP_CONNECT => Some(DirectoryOp::Connect),
            OP_DISCONNECT => Some(DirectoryOp::Disconnect),
            OP_PUBLISH => Some(DirectoryOp::Publish),
            OP_DELETE => Some(DirectoryOp::Delete),
            OP_LIST_USERS => Some(DirectoryOp::ListUsers),
            OP_LIST_CONTENT => Some(DirectoryOp::ListContent),
            _ => None,
        }
    }

    /// Number of argument tokens following the tag.
    pub fn arity(self) -> usize {
        match self {
            DirectoryOp::Register
            | DirectoryOp::Unregister
            | DirectoryOp::Disconnect
            | DirectoryOp::ListUsers => 1,
            DirectoryOp::Connect | DirectoryOp::Delete | DirectoryOp::ListContent => 2,
            DirectoryOp::Publish => 3,
        }
    }

    /// The negative acknowledgement a non-zero status stands for, if the
    /// operation defines one.
    pub fn nack(self, status: u8) -> Option<AppError> {
        use AppError::*;
        let table: &[AppError] = match self {
            DirectoryOp::Register => &[UsernameInUse],
            DirectoryOp::Unregister => &[UserDoesNotExist],
            DirectoryOp::Connect => &[UserDoesNotExist, AlreadyConnected],
            DirectoryOp::Disconnect => &[UserDoesNotExist, NotConnected],
            DirectoryOp::Publish => &[UserDoesNotExist, NotConnected, ContentAlreadyPublished],
            DirectoryOp::Delete => &[UserDoesNotExist, NotConnected, ContentNotPublished],
            DirectoryOp::ListUsers => &[UserDoesNotExist, NotConnected],
            DirectoryOp::ListContent => &[UserDoesNotExist, NotConnected, RemoteUserDoesNotExist],
        };
        (status as usize)
            .checked_sub(1)
            .and_then(|i| table.get(i))
            .copied()
    }

    /// Maps a status byte to the three-tier result.
    pub fn check_status(self, status: u8) -> Result<(), ClientError> {
        if status == STATUS_OK {
            return Ok(());
        }
        match self.nack(status) {
            Some(reason) => Err(ClientError::Application(reason)),
            None => Err(ClientError::Transport(TransportError::UnexpectedStatus(status))),
        }
    }
}

/// One request to the directory: an operation plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRequest {
    pub op: DirectoryOp,
    pub args: Vec<String>,
}

impl DirectoryRequest {
    pub fn new<I, S>(op: DirectoryOp, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn register(user: &str) -> Self {
        Self::new(DirectoryOp::Register, [user])
    }

    pub fn unregister(user: &str) -> Self {
        Self::new(DirectoryOp::Unregister, [user])
    }

    pub fn connect(user: &str, listen_port: u16) -> Self {
        Self::new(DirectoryOp::Connect, [user.to_string(), listen_port.to_string()])
    }

    pub fn disconnect(user: &str) -> Self {
        Self::new(DirectoryOp::Disconnect, [user])
    }

    pub fn publish(user: &str, file_name: &str, description: &str) -> Self {
        Self::new(DirectoryOp::Publish, [user, file_name, description])
    }

    pub fn delete(user: &str, file_name: &str) -> Self {
        Self::new(DirectoryOp::Delete, [user, file_name])
    }

    pub fn list_users(user: &str) -> Self {
        Self::new(DirectoryOp::ListUsers, [user])
    }

    pub fn list_content(user: &str, target: &str) -> Self {
        Self::new(DirectoryOp::ListContent, [user, target])
    }
}

/// A connected user as advertised by LIST USERS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub address: PeerAddress,
}

/// Where a peer's file server can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddress {
    pub ip: String,
    pub port: u16,
}

impl std::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Decoded reply. Only list operations carry records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryResponse {
    Done,
    Users(Vec<UserRecord>),
    Content(Vec<String>),
}
