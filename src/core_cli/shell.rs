use crate::core_cli::command::{Command, ParseError};
use anyhow::Result;
use colored::Colorize;
use log::{debug, info};
use peershare::{ClientResult, Session};
use std::path::Path;
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// One line of output for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Ok(String),
    Fail(String),
    Data(String),
}

impl Line {
    fn render(&self) -> String {
        match self {
            Line::Ok(s) => s.green().to_string(),
            Line::Fail(s) => s.red().to_string(),
            Line::Data(s) => s.clone(),
        }
    }
}

pub const HELP: &[&str] = &[
    "Available commands:",
    "  REGISTER <username>",
    "  UNREGISTER <username>",
    "  CONNECT <username>",
    "  DISCONNECT <username>",
    "  PUBLISH <filename> <description>",
    "  DELETE <filename>",
    "  LIST USERS",
    "  LIST CONTENT <username>",
    "  GET FILE <username> <remote_file> <local_file>",
    "  QUIT",
];

/// Reads commands from stdin until QUIT or end of input.
pub async fn run(mut session: Session) -> Result<()> {
    let mut out = stdout();
    for line in HELP {
        out.write_all(format!("{}\n", line).as_bytes()).await?;
    }

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        out.write_all(b"c> ").await?;
        out.flush().await?;

        let Some(input) = lines.next_line().await? else {
            debug!("End of input");
            break;
        };

        let command = match Command::parse(&input) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(ParseError::InvalidList) => {
                print_lines(&mut out, &[Line::Fail("Invalid LIST command".into())]).await?;
                continue;
            }
            Err(ParseError::Unknown) => {
                print_lines(&mut out, &[Line::Fail("Unknown command".into())]).await?;
                continue;
            }
        };

        let output = execute(&mut session, &command).await;
        print_lines(&mut out, &output).await?;
    }

    if let Some(line) = finish(&mut session).await {
        print_lines(&mut out, &[line]).await?;
    }
    info!("Client terminated");
    Ok(())
}

async fn print_lines(out: &mut tokio::io::Stdout, lines: &[Line]) -> std::io::Result<()> {
    for line in lines {
        out.write_all(format!("{}\n", line.render()).as_bytes()).await?;
    }
    out.flush().await
}

fn status<T>(command: &Command, result: &ClientResult<T>) -> Line {
    match result {
        Ok(_) => Line::Ok(format!("{} OK", command.label())),
        Err(e) => Line::Fail(e.to_cli_response(command.label())),
    }
}

/// Leaves the directory on exit; returns the DISCONNECT line if a user was connected.
pub async fn finish(session: &mut Session) -> Option<Line> {
    let user = session.connected_user()?.to_string();
    let result = session.shutdown().await;
    Some(status(&Command::Disconnect(user), &result))
}

/// Runs one command against the session and renders the outcome.
pub async fn execute(session: &mut Session, command: &Command) -> Vec<Line> {
    match command {
        Command::Register(user) => vec![status(command, &session.register(user).await)],
        Command::Unregister(user) => vec![status(command, &session.unregister(user).await)],
        Command::Connect(user) => vec![status(command, &session.connect(user).await)],
        Command::Disconnect(user) => vec![status(command, &session.disconnect(user).await)],
        Command::Publish {
            file_name,
            description,
        } => vec![status(command, &session.publish(file_name, description).await)],
        Command::Delete(file_name) => vec![status(command, &session.delete(file_name).await)],
        Command::ListUsers => {
            let result = session.list_users().await;
            let mut lines = vec![status(command, &result)];
            for user in result.iter().flatten() {
                lines.push(Line::Data(format!(
                    "  {} {} {}",
                    user.username, user.address.ip, user.address.port
                )));
            }
            lines
        }
        Command::ListContent(target) => {
            let result = session.list_content(target).await;
            let mut lines = vec![status(command, &result)];
            for file in result.iter().flatten() {
                lines.push(Line::Data(format!("  {}", file)));
            }
            lines
        }
        Command::GetFile {
            user,
            remote,
            local,
        } => vec![status(
            command,
            &session.get_file(user, remote, Path::new(local)).await,
        )],
        Command::Quit => Vec::new(),
    }
}
