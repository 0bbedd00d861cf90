// Commands accepted at the interactive prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register(String),
    Unregister(String),
    Connect(String),
    Disconnect(String),
    Publish { file_name: String, description: String },
    Delete(String),
    ListUsers,
    ListContent(String),
    GetFile { user: String, remote: String, local: String },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    InvalidList,
    Unknown,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return Err(ParseError::Empty);
        };
        let arg = |i: usize| parts[i].to_string();

        match (first.to_ascii_uppercase().as_str(), parts.len()) {
            ("REGISTER", 2) => Ok(Command::Register(arg(1))),
            ("UNREGISTER", 2) => Ok(Command::Unregister(arg(1))),
            ("CONNECT", 2) => Ok(Command::Connect(arg(1))),
            ("DISCONNECT", 2) => Ok(Command::Disconnect(arg(1))),
            ("PUBLISH", n) if n >= 3 => Ok(Command::Publish {
                file_name: arg(1),
                description: parts[2..].join(" "),
            }),
            ("DELETE", 2) => Ok(Command::Delete(arg(1))),
            ("LIST", n) => {
                let what = parts.get(1).map(|s| s.to_ascii_uppercase());
                match (what.as_deref(), n) {
                    (Some("USERS"), 2) => Ok(Command::ListUsers),
                    (Some("CONTENT"), 3) => Ok(Command::ListContent(arg(2))),
                    _ => Err(ParseError::InvalidList),
                }
            }
            ("GET", 5) if parts[1].eq_ignore_ascii_case("FILE") => Ok(Command::GetFile {
                user: arg(2),
                remote: arg(3),
                local: arg(4),
            }),
            ("QUIT", _) => Ok(Command::Quit),
            _ => Err(ParseError::Unknown),
        }
    }

    /// Name used in status lines, e.g. `LIST_CONTENT FAIL`.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Register(_) => "REGISTER",
            Command::Unregister(_) => "UNREGISTER",
            Command::Connect(_) => "CONNECT",
            Command::Disconnect(_) => "DISCONNECT",
            Command::Publish { .. } => "PUBLISH",
            Command::Delete(_) => "DELETE",
            Command::ListUsers => "LIST_USERS",
            Command::ListContent(_) => "LIST_CONTENT",
            Command::GetFile { .. } => "GET_FILE",
            Command::Quit => "QUIT",
        }
    }
}
