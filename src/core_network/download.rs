use crate::constants::{STATUS_FILE_NOT_FOUND, STATUS_OK, OP_GET_FILE};
use crate::core_directory::{DirectoryClient, PeerAddress};
use crate::core_protocol::codec::{read_number, read_status, write_token};
use crate::core_protocol::error::{AppError, ClientError, ClientResult, TransportError};
use crate::helpers::connect;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};

/// Progress of one GET FILE call.
#[derive(Debug, Clone)]
pub struct FileTransfer {
    pub remote_file_name: String,
    pub local_path: PathBuf,
    pub expected_size: u64,
    pub bytes_received: u64,
}

impl FileTransfer {
    pub fn is_complete(&self) -> bool {
        self.bytes_received == self.expected_size
    }
}

/// Fetches files directly from other peers.
#[derive(Debug, Clone)]
pub struct FileTransferClient {
    directory: DirectoryClient,
    chunk_size: usize,
    connect_timeout: Option<Duration>,
}

impl FileTransferClient {
    pub fn new(directory: DirectoryClient, chunk_size: usize) -> Self {
        Self {
            directory,
            chunk_size: chunk_size.max(1),
            connect_timeout: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Looks up where `target` is reachable, asking as `me`.
    pub async fn resolve(&self, me: &str, target: &str) -> ClientResult<PeerAddress> {
        let users = self
            .directory
            .list_users(me)
            .await
            .map_err(|e| match e {
                // Resolving is internal: a refusal here is not the caller's
                // own LIST USERS failing.
                ClientError::Application(reason) => {
                    warn!("Cannot resolve {}: directory refused ({})", target, reason);
                    ClientError::Transport(TransportError::PeerNotFound(target.to_string()))
                }
                other => other,
            })?;

        users
            .into_iter()
            .find(|u| u.username == target)
            .map(|u| u.address)
            .ok_or_else(|| {
                warn!("User {} is not in the directory's online list", target);
                TransportError::PeerNotFound(target.to_string()).into()
            })
    }

    /// Resolves `target` then downloads `remote_file` into `local_path`.
    pub async fn get_file(
        &self,
        me: &str,
        target: &str,
        remote_file: &str,
        local_path: &Path,
    ) -> ClientResult<FileTransfer> {
        let peer = self.resolve(me, target).await?;
        self.fetch(&peer, remote_file, local_path).await
    }

    /// Downloads `remote_file` from `peer`. Any partially written file is
    /// removed before an error is returned.
    pub async fn fetch(
        &self,
        peer: &PeerAddress,
        remote_file: &str,
        local_path: &Path,
    ) -> ClientResult<FileTransfer> {
        let mut transfer = FileTransfer {
            remote_file_name: remote_file.to_string(),
            local_path: local_path.to_path_buf(),
            expected_size: 0,
            bytes_received: 0,
        };

        let mut created = false;
        let result = self
            .fetch_into(peer, &mut transfer, &mut created)
            .await;

        match result {
            Ok(()) => {
                info!(
                    "Received {} from {} into {:?} ({} bytes)",
                    remote_file, peer, local_path, transfer.bytes_received
                );
                Ok(transfer)
            }
            Err(e) => {
                if created {
                    remove_partial(local_path).await;
                }
                match &e {
                    ClientError::Application(reason) => {
                        warn!("GET FILE {} from {}: {}", remote_file, peer, reason)
                    }
                    ClientError::Transport(cause) => {
                        error!("GET FILE {} from {} failed: {}", remote_file, peer, cause)
                    }
                }
                Err(e)
            }
        }
    }

    async fn fetch_into(
        &self,
        peer: &PeerAddress,
        transfer: &mut FileTransfer,
        created: &mut bool,
    ) -> ClientResult<()> {
        let stream = connect(&peer.ip, peer.port, self.connect_timeout).await?;
        let mut stream = BufReader::new(stream);

        write_token(&mut stream, OP_GET_FILE).await?;
        write_token(&mut stream, &transfer.remote_file_name).await?;
        stream.flush().await?;

        match read_status(&mut stream).await? {
            STATUS_OK => {}
            STATUS_FILE_NOT_FOUND => return Err(AppError::RemoteFileDoesNotExist.into()),
            other => return Err(TransportError::UnexpectedStatus(other).into()),
        }

        transfer.expected_size = read_number(&mut stream).await?;
        debug!(
            "Peer {} announced {} bytes for {}",
            peer, transfer.expected_size, transfer.remote_file_name
        );

        let mut file = File::create(&transfer.local_path)
            .await
            .map_err(TransportError::LocalIo)?;
        *created = true;

        transfer.bytes_received =
            copy_exact(&mut stream, &mut file, transfer.expected_size, self.chunk_size).await?;
        file.sync_all().await.map_err(TransportError::LocalIo)?;

        if !transfer.is_complete() {
            return Err(TransportError::ShortTransfer {
                expected: transfer.expected_size,
                received: transfer.bytes_received,
            }
            .into());
        }

        let _ = stream.get_mut().shutdown().await;
        Ok(())
    }
}

/// Copies at most `expected` bytes in `chunk_size` pieces, stopping early
/// at end of stream. Returns the number of bytes written.
async fn copy_exact<R>(
    reader: &mut R,
    file: &mut File,
    expected: u64,
    chunk_size: usize,
) -> Result<u64, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0; chunk_size];
    let mut received = 0u64;
    while received < expected {
        let want = (expected - received).min(chunk_size as u64) as usize;
        let n = reader.read(&mut buffer[..want]).await?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])
            .await
            .map_err(TransportError::LocalIo)?;
        received += n as u64;
    }
    file.flush().await.map_err(TransportError::LocalIo)?;
    Ok(received)
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed incomplete file {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => error!("Failed to remove incomplete file {:?}: {}", path, e),
    }
}
