use crate::config::ClientConfig;
use crate::core_directory::{DirectoryClient, UserRecord};
use crate::core_network::{FileTransfer, FileTransferClient, PeerFileServer, PeerServerOptions};
use crate::core_protocol::error::{AppError, ClientError, ClientResult, TransportError};
use log::{info, warn};
use std::path::Path;

/// The connected user and the file server advertised for them. Exists only
/// while connected, so the listener can't outlive the session.
struct ActiveSession {
    user: String,
    server: PeerFileServer,
}

/// Client-side session: at most one connected user per handle.
///
/// Owned by the caller; operations take `&mut self`, so connect and
/// disconnect transitions never overlap.
pub struct Session {
    directory: DirectoryClient,
    transfers: FileTransferClient,
    server_options: PeerServerOptions,
    active: Option<ActiveSession>,
}

impl Session {
    pub fn new(config: &ClientConfig) -> Self {
        let timeout = config.connect_timeout();
        let directory = DirectoryClient::new(config.directory_host.clone(), config.directory_port)
            .with_connect_timeout(timeout);
        let transfers = FileTransferClient::new(directory.clone(), config.chunk_size())
            .with_connect_timeout(timeout);

        Self {
            directory,
            transfers,
            server_options: config.peer_server_options(),
            active: None,
        }
    }

    pub fn directory(&self) -> &DirectoryClient {
        &self.directory
    }

    pub fn connected_user(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.user.as_str())
    }

    pub fn listen_port(&self) -> Option<u16> {
        self.active.as_ref().map(|a| a.server.port())
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    fn current_user(&self) -> ClientResult<&str> {
        self.connected_user()
            .ok_or(ClientError::Application(AppError::SessionNotConnected))
    }

    pub async fn register(&self, user: &str) -> ClientResult<()> {
        self.directory.register(user).await
    }

    pub async fn unregister(&self, user: &str) -> ClientResult<()> {
        self.directory.unregister(user).await
    }

    /// Goes online as `user`, replacing any current session.
    pub async fn connect(&mut self, user: &str) -> ClientResult<()> {
        if let Some(previous) = self.connected_user().map(str::to_string) {
            info!("Disconnecting {} before connecting {}", previous, user);
            if let Err(e) = self.disconnect(&previous).await {
                warn!("Implicit disconnect of {} reported: {}", previous, e);
            }
        }

        let mut server = PeerFileServer::start(self.server_options.clone())
            .await
            .map_err(TransportError::LocalIo)?;

        match self.directory.connect(user, server.port()).await {
            Ok(()) => {
                info!("{} connected, serving files on port {}", user, server.port());
                self.active = Some(ActiveSession {
                    user: user.to_string(),
                    server,
                });
                Ok(())
            }
            Err(e) => {
                server.stop().await;
                Err(e)
            }
        }
    }

    /// Goes offline. The local listener is stopped whatever the directory
    /// answers; its answer is still returned.
    pub async fn disconnect(&mut self, user: &str) -> ClientResult<()> {
        if self.connected_user() != Some(user) {
            return Err(AppError::SessionNotConnected.into());
        }

        let result = self.directory.disconnect(user).await;

        if let Some(mut active) = self.active.take() {
            active.server.stop().await;
        }
        info!("{} disconnected", user);
        result
    }

    /// Disconnects whoever is connected, if anyone.
    pub async fn shutdown(&mut self) -> ClientResult<()> {
        match self.connected_user().map(str::to_string) {
            Some(user) => self.disconnect(&user).await,
            None => Ok(()),
        }
    }

    pub async fn publish(&self, file_name: &str, description: &str) -> ClientResult<()> {
        let user = self.current_user()?;
        self.directory.publish(user, file_name, description).await
    }

    pub async fn delete(&self, file_name: &str) -> ClientResult<()> {
        let user = self.current_user()?;
        self.directory.delete(user, file_name).await
    }

    pub async fn list_users(&self) -> ClientResult<Vec<UserRecord>> {
        let user = self.current_user()?;
        self.directory.list_users(user).await
    }

    pub async fn list_content(&self, target: &str) -> ClientResult<Vec<String>> {
        let user = self.current_user()?;
        self.directory.list_content(user, target).await
    }

    pub async fn get_file(
        &self,
        target: &str,
        remote_file: &str,
        local_path: &Path,
    ) -> ClientResult<FileTransfer> {
        let user = self.current_user()?;
        self.transfers
            .get_file(user, target, remote_file, local_path)
            .await
    }
}
