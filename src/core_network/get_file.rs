use crate::constants::{STATUS_FILE_NOT_FOUND, STATUS_OK, STATUS_PEER_ERROR};
use crate::core_protocol::codec::{read_token, write_number, write_status};
use crate::core_protocol::error::CodecError;
use crate::helpers::resolve_shared_path;
use log::{error, info, warn};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Handles the GET FILE peer command.
///
/// Reads the requested file name, then answers with status `0`, the file
/// length as a decimal token and the raw bytes; or status `1` when there is
/// no such regular file under `shared_dir`.
///
/// # Arguments
///
/// * `stream` - The peer connection, positioned just after the operation token.
/// * `shared_dir` - Root from which requested names are resolved.
/// * `chunk_size` - Read buffer size used while streaming.
///
/// # Returns
///
/// Result<u64, CodecError> with the number of bytes streamed (0 for "not found").
pub async fn handle_get_file_command<S>(
    stream: &mut S,
    shared_dir: &Path,
    chunk_size: usize,
) -> Result<u64, CodecError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let requested = read_token(stream).await?;

    let Some(file_path) = resolve_shared_path(shared_dir, &requested) else {
        warn!("GET FILE rejected for {:?}", requested);
        write_status(stream, STATUS_FILE_NOT_FOUND).await?;
        return Ok(0);
    };

    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(m) if m.is_file() => m,
        _ => {
            info!("GET FILE {:?}: not found", file_path);
            write_status(stream, STATUS_FILE_NOT_FOUND).await?;
            return Ok(0);
        }
    };

    // Open before answering so an unreadable file still gets an error status.
    let mut file = File::open(&file_path).await?;
    let size = metadata.len();

    write_status(stream, STATUS_OK).await?;
    write_number(stream, size).await?;

    let mut buffer = vec![0; chunk_size.max(1)];
    let mut sent = 0u64;
    while sent < size {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        // Never send more than advertised if the file grew meanwhile.
        let take = usize::try_from(size - sent).map_or(bytes_read, |left| left.min(bytes_read));
        stream.write_all(&buffer[..take]).await?;
        sent += take as u64;
    }
    stream.flush().await?;

    if sent < size {
        error!(
            "File {:?} shrank while sending: {} of {} bytes",
            file_path, sent, size
        );
    } else {
        info!("Sent file {:?} ({} bytes)", file_path, size);
    }
    Ok(sent)
}

/// Best-effort error status once a handler has failed.
pub async fn send_peer_error<S>(stream: &mut S)
where
    S: AsyncWrite + Unpin,
{
    if write_status(stream, STATUS_PEER_ERROR).await.is_ok() {
        let _ = stream.flush().await;
    }
}
