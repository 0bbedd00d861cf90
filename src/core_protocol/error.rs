// Error taxonomy shared by the directory client, the peer server and downloads.
use thiserror::Error;

/// Failures of the token/status framing layer.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("connection closed before any data was received")]
    Closed,

    #[error("connection closed in the middle of a token ({0} bytes read)")]
    Truncated(usize),

    #[error("token exceeds {0} bytes")]
    TooLong(usize),

    #[error("token is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("expected a decimal number, got {0:?}")]
    InvalidNumber(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Well-defined negative answers. Always recoverable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    #[error("username in use")]
    UsernameInUse,

    #[error("user does not exist")]
    UserDoesNotExist,

    #[error("user already connected")]
    AlreadyConnected,

    #[error("user not connected")]
    NotConnected,

    #[error("content already published")]
    ContentAlreadyPublished,

    #[error("content not published")]
    ContentNotPublished,

    #[error("remote user does not exist")]
    RemoteUserDoesNotExist,

    #[error("remote file does not exist")]
    RemoteFileDoesNotExist,

    /// Raised locally, without contacting the network.
    #[error("user not connected")]
    SessionNotConnected,
}

/// Connection refused or dropped, malformed replies, local I/O failures.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out connecting to {0}")]
    Timeout(String),

    #[error("protocol error: {0}")]
    Codec(#[from] CodecError),

    #[error("unexpected status byte {0}")]
    UnexpectedStatus(u8),

    #[error("user {0} is not online")]
    PeerNotFound(String),

    #[error("transfer ended after {received} of {expected} bytes")]
    ShortTransfer { expected: u64, received: u64 },

    #[error("local I/O error: {0}")]
    LocalIo(#[source] std::io::Error),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Codec(CodecError::Io(err))
    }
}

/// The outcome of a failed operation: either the remote party said no, or
/// the exchange itself broke.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Application(#[from] AppError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<CodecError> for ClientError {
    fn from(err: CodecError) -> Self {
        ClientError::Transport(TransportError::Codec(err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Transport(err.into())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

pub const CODE_ERROR: u8 = 1;
pub const CODE_USER_ERROR: u8 = 2;

impl ClientError {
    pub fn is_application(&self) -> bool {
        matches!(self, ClientError::Application(_))
    }

    pub fn app_error(&self) -> Option<AppError> {
        match self {
            ClientError::Application(e) => Some(*e),
            ClientError::Transport(_) => None,
        }
    }

    /// Numeric return code handed to the command layer.
    pub fn code(&self) -> u8 {
        match self {
            ClientError::Application(_) => CODE_USER_ERROR,
            ClientError::Transport(_) => CODE_ERROR,
        }
    }

    /// Renders the status line printed for a failed `op` (e.g. `"LIST_CONTENT"`).
    pub fn to_cli_response(&self, op: &str) -> String {
        let reason = match self {
            ClientError::Transport(_) => return format!("{} FAIL", op),
            ClientError::Application(AppError::UsernameInUse) => return "USERNAME IN USE".to_string(),
            ClientError::Application(AppError::UserDoesNotExist) if op == "UNREGISTER" => {
                return "USER DOES NOT EXIST".to_string()
            }
            ClientError::Application(AppError::AlreadyConnected) => {
                return "USER ALREADY CONNECTED".to_string()
            }
            ClientError::Application(AppError::UserDoesNotExist) => "USER DOES NOT EXIST",
            ClientError::Application(AppError::NotConnected)
            | ClientError::Application(AppError::SessionNotConnected) => "USER NOT CONNECTED",
            ClientError::Application(AppError::ContentAlreadyPublished) => {
                "CONTENT ALREADY PUBLISHED"
            }
            ClientError::Application(AppError::ContentNotPublished) => "CONTENT NOT PUBLISHED",
            ClientError::Application(AppError::RemoteUserDoesNotExist) => {
                "REMOTE USER DOES NOT EXIST"
            }
            ClientError::Application(AppError::RemoteFileDoesNotExist) => "FILE NOT EXIST",
        };
        format!("{} FAIL, {}", op, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_tier() {
        let app: ClientError = AppError::UsernameInUse.into();
        let transport: ClientError = TransportError::UnexpectedStatus(7).into();
        assert_eq!(app.code(), CODE_USER_ERROR);
        assert!(app.is_application());
        assert_eq!(transport.code(), CODE_ERROR);
        assert_eq!(transport.app_error(), None);
    }

    #[test]
    fn test_cli_responses() {
        let err: ClientError = AppError::ContentAlreadyPublished.into();
        assert_eq!(
            err.to_cli_response("PUBLISH"),
            "PUBLISH FAIL, CONTENT ALREADY PUBLISHED"
        );

        let err: ClientError = AppError::SessionNotConnected.into();
        assert_eq!(
            err.to_cli_response("GET_FILE"),
            "GET_FILE FAIL, USER NOT CONNECTED"
        );

        let err: ClientError = AppError::UsernameInUse.into();
        assert_eq!(err.to_cli_response("REGISTER"), "USERNAME IN USE");

        let err: ClientError = TransportError::PeerNotFound("bob".into()).into();
        assert_eq!(err.to_cli_response("GET_FILE"), "GET_FILE FAIL");
    }
}
