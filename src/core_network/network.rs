use crate::constants::OP_GET_FILE;
use crate::core_network::get_file::{handle_get_file_command, send_peer_error};
use crate::core_protocol::codec::read_token;
use crate::core_protocol::error::CodecError;
use log::{debug, error, info, trace, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

/// Settings shared by every connection handler of one peer server.
#[derive(Debug, Clone)]
pub struct PeerServerOptions {
    pub bind_address: String,
    pub shared_dir: PathBuf,
    pub chunk_size: usize,
    pub max_connections: usize,
}

/// Serves local files to other peers from an OS-assigned port.
///
/// The accept loop runs on its own task; each accepted connection gets a
/// handler task, at most `max_connections` at a time.
pub struct PeerFileServer {
    port: u16,
    shutdown: Arc<Notify>,
    accept_task: Option<JoinHandle<()>>,
}

impl PeerFileServer {
    /// Binds the listening socket and launches the accept loop.
    pub async fn start(options: PeerServerOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind((options.bind_address.as_str(), 0)).await?;
        let port = listener.local_addr()?.port();
        info!("Peer server listening on {}:{}", options.bind_address, port);

        let shutdown = Arc::new(Notify::new());
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::new(options),
            Arc::clone(&shutdown),
        ));

        Ok(Self {
            port,
            shutdown,
            accept_task: Some(accept_task),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_running(&self) -> bool {
        self.accept_task.is_some()
    }

    /// Closes the listening socket. In-flight handlers run to completion.
    /// Calling it again is a no-op.
    pub async fn stop(&mut self) {
        let Some(task) = self.accept_task.take() else {
            return;
        };
        // notify_one stores a permit, so this is not lost if the loop is
        // not parked in select! right now.
        self.shutdown.notify_one();
        if let Err(e) = task.await {
            warn!("Peer server accept loop ended abnormally: {}", e);
        }
        info!("Peer server on port {} stopped", self.port);
    }
}

impl Drop for PeerFileServer {
    fn drop(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, options: Arc<PeerServerOptions>, shutdown: Arc<Notify>) {
    let limit = Arc::new(Semaphore::new(options.max_connections.max(1)));

    loop {
        // Wait for a free handler slot before accepting.
        let permit = tokio::select! {
            _ = shutdown.notified() => break,
            permit = Arc::clone(&limit).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let (socket, addr) = tokio::select! {
            _ = shutdown.notified() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Peer server accept failed: {}", e);
                    break;
                }
            },
        };
        debug!("Peer connection from {}", addr);

        let options = Arc::clone(&options);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, addr, &options).await {
                error!("Peer connection {} failed: {}", addr, e);
            }
            debug!("Peer connection closed for {}", addr);
            drop(permit);
        });
    }

    trace!("Peer server accept loop exiting");
    drop(listener);
}

/// Runs one peer request and closes the connection.
pub async fn handle_connection(
    socket: TcpStream,
    addr: SocketAddr,
    options: &PeerServerOptions,
) -> Result<(), CodecError> {
    let mut stream = BufReader::new(socket);

    let result = match read_token(&mut stream).await {
        Ok(op) if op == OP_GET_FILE => {
            handle_get_file_command(&mut stream, &options.shared_dir, options.chunk_size)
                .await
                .map(|sent| trace!("{} bytes sent to {}", sent, addr))
        }
        Ok(op) => {
            warn!("Unknown peer operation {:?} from {}", op, addr);
            send_peer_error(&mut stream).await;
            Ok(())
        }
        Err(e) => Err(e),
    };

    if result.is_err() {
        send_peer_error(&mut stream).await;
    }
    let _ = stream.get_mut().shutdown().await;
    result
}
