use crate::core_protocol::error::TransportError;
use log::debug;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::net::TcpStream;

/// Sanitizes input to prevent directory traversal attacks and ensure paths are relative.
pub fn sanitize_input(input: &str) -> String {
    // Remove directory traversal sequences until none reappear ("....//" -> "../")
    let mut sanitized_input = input.to_string();
    loop {
        let next = sanitized_input.replace("../", "").replace("..\\", "");
        if next == sanitized_input {
            break;
        }
        sanitized_input = next;
    }
    // Remove any leading slashes
    sanitized_input.trim_start_matches('/').to_string()
}

/// Resolves a file name requested by a peer against the shared directory.
/// Returns `None` when the result would still escape `root`.
pub fn resolve_shared_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let sanitized = sanitize_input(requested);
    let relative = Path::new(&sanitized);
    let inside = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if sanitized.is_empty() || !inside {
        return None;
    }
    Some(root.join(relative))
}

/// Opens a TCP connection, optionally bounded by `deadline`.
pub async fn connect(
    host: &str,
    port: u16,
    deadline: Option<Duration>,
) -> Result<TcpStream, TransportError> {
    let addr = format!("{}:{}", host, port);
    debug!("Connecting to {}", addr);

    let attempt = TcpStream::connect((host, port));
    let result = match deadline {
        Some(limit) => match tokio::time::timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => return Err(TransportError::Timeout(addr)),
        },
        None => attempt.await,
    };

    result.map_err(|source| TransportError::Connect { addr, source })
}
