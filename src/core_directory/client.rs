use crate::core_directory::request::{
    DirectoryOp, DirectoryRequest, DirectoryResponse, PeerAddress, UserRecord,
};
use crate::core_protocol::codec::{read_number, read_status, read_token, write_token};
use crate::core_protocol::error::{ClientError, ClientResult, TransportError};
use crate::helpers::connect;
use log::{debug, error, warn};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};

/// Talks to the directory server, one short-lived connection per call.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    host: String,
    port: u16,
    connect_timeout: Option<Duration>,
}

impl DirectoryClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub async fn register(&self, user: &str) -> ClientResult<()> {
        self.call(&DirectoryRequest::register(user)).await.map(drop)
    }

    pub async fn unregister(&self, user: &str) -> ClientResult<()> {
        self.call(&DirectoryRequest::unregister(user)).await.map(drop)
    }

    /// Announces `user` as online, reachable on `listen_port`.
    pub async fn connect(&self, user: &str, listen_port: u16) -> ClientResult<()> {
        self.call(&DirectoryRequest::connect(user, listen_port))
            .await
            .map(drop)
    }

    pub async fn disconnect(&self, user: &str) -> ClientResult<()> {
        self.call(&DirectoryRequest::disconnect(user)).await.map(drop)
    }

    pub async fn publish(&self, user: &str, file_name: &str, description: &str) -> ClientResult<()> {
        self.call(&DirectoryRequest::publish(user, file_name, description))
            .await
            .map(drop)
    }

    pub async fn delete(&self, user: &str, file_name: &str) -> ClientResult<()> {
        self.call(&DirectoryRequest::delete(user, file_name))
            .await
            .map(drop)
    }

    /// Lists connected users, asked on behalf of `user`.
    pub async fn list_users(&self, user: &str) -> ClientResult<Vec<UserRecord>> {
        match self.call(&DirectoryRequest::list_users(user)).await? {
            DirectoryResponse::Users(users) => Ok(users),
            _ => Ok(Vec::new()),
        }
    }

    /// Lists the files `target` has published, asked on behalf of `user`.
    pub async fn list_content(&self, user: &str, target: &str) -> ClientResult<Vec<String>> {
        match self.call(&DirectoryRequest::list_content(user, target)).await? {
            DirectoryResponse::Content(files) => Ok(files),
            _ => Ok(Vec::new()),
        }
    }

    /// Performs one request/response exchange and closes the connection.
    pub async fn call(&self, request: &DirectoryRequest) -> ClientResult<DirectoryResponse> {
        let tag = request.op.tag();
        let result = self.exchange(request).await;
        match &result {
            Ok(_) => debug!("{} OK", tag),
            Err(ClientError::Application(reason)) => warn!("{} refused: {}", tag, reason),
            Err(ClientError::Transport(e)) => error!("{} failed: {}", tag, e),
        }
        result
    }

    async fn exchange(&self, request: &DirectoryRequest) -> ClientResult<DirectoryResponse> {
        let stream = connect(&self.host, self.port, self.connect_timeout).await?;
        let mut stream = BufReader::new(stream);

        write_token(&mut stream, request.op.tag()).await?;
        for arg in &request.args {
            write_token(&mut stream, arg).await?;
        }
        stream.flush().await?;

        let status = read_status(&mut stream).await?;
        request.op.check_status(status)?;

        let response = match request.op {
            DirectoryOp::ListUsers => DirectoryResponse::Users(read_users(&mut stream).await?),
            DirectoryOp::ListContent => {
                DirectoryResponse::Content(read_content(&mut stream).await?)
            }
            _ => DirectoryResponse::Done,
        };

        // Best effort: the reply is already complete.
        let _ = stream.get_mut().shutdown().await;
        Ok(response)
    }
}

async fn read_users<R>(stream: &mut R) -> Result<Vec<UserRecord>, TransportError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let count: usize = read_number(stream).await?;
    let mut users = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let username = read_token(stream).await?;
        let ip = read_token(stream).await?;
        let port = read_number(stream).await?;
        users.push(UserRecord {
            username,
            address: PeerAddress { ip, port },
        });
    }
    Ok(users)
}

async fn read_content<R>(stream: &mut R) -> Result<Vec<String>, TransportError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let count: usize = read_number(stream).await?;
    let mut files = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        files.push(read_token(stream).await?);
    }
    Ok(files)
}
