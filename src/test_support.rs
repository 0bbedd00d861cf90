//! In-process stand-ins for the directory server and for misbehaving peers.

use crate::constants::OP_GET_FILE;
use crate::core_directory::{DirectoryClient, DirectoryOp, DirectoryRequest, PeerAddress};
use crate::core_protocol::codec::{read_token, write_number, write_status, write_token};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// How the mock answers an operation instead of applying it.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Close the connection without a status byte.
    Drop,
    /// Reply with this status and nothing else.
    Status(u8),
}

#[derive(Debug, Default)]
struct MockUser {
    name: String,
    online: Option<PeerAddress>,
    files: Vec<String>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: Vec<MockUser>,
    requests: Vec<DirectoryRequest>,
    faults: HashMap<DirectoryOp, Fault>,
}

/// A directory server holding its state in memory, recording every request.
pub struct MockDirectory {
    addr: SocketAddr,
    state: Arc<Mutex<DirectoryState>>,
}

impl MockDirectory {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(DirectoryState::default()));

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((socket, peer)) = listener.accept().await {
                let state = Arc::clone(&shared);
                tokio::spawn(async move {
                    let _ = serve(socket, peer, state).await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn client(&self) -> DirectoryClient {
        DirectoryClient::new(self.addr.ip().to_string(), self.addr.port())
    }

    pub fn requests(&self) -> Vec<DirectoryRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn ops(&self) -> Vec<DirectoryOp> {
        self.requests().into_iter().map(|r| r.op).collect()
    }

    pub fn inject(&self, op: DirectoryOp, fault: Fault) {
        self.state.lock().unwrap().faults.insert(op, fault);
    }

    pub fn clear_faults(&self) {
        self.state.lock().unwrap().faults.clear();
    }

    pub fn is_online(&self, user: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .any(|u| u.name == user && u.online.is_some())
    }
}

async fn read_request<R>(reader: &mut R) -> Option<(String, Vec<String>)>
where
    R: AsyncRead + Unpin,
{
    let tag = read_token(reader).await.ok()?;
    let arity = match DirectoryOp::from_tag(&tag) {
        Some(op) => op.arity(),
        None if tag == OP_GET_FILE => 1,
        None => 0,
    };
    let mut args = Vec::with_capacity(arity);
    for _ in 0..arity {
        args.push(read_token(reader).await.ok()?);
    }
    Some((tag, args))
}

async fn serve(
    socket: TcpStream,
    peer: SocketAddr,
    state: Arc<Mutex<DirectoryState>>,
) -> std::io::Result<()> {
    let mut stream = BufReader::new(socket);
    let Some((tag, args)) = read_request(&mut stream).await else {
        return Ok(());
    };
    let Some(op) = DirectoryOp::from_tag(&tag) else {
        return Ok(());
    };
    let request = DirectoryRequest::new(op, args);

    let reply = {
        let mut state = state.lock().unwrap();
        state.requests.push(request.clone());
        match state.faults.get(&op).copied() {
            Some(Fault::Drop) => return Ok(()),
            Some(Fault::Status(status)) => Reply::Status(status),
            None => apply(&mut state, &request, peer),
        }
    };

    match reply {
        Reply::Status(status) => write_status(&mut stream, status).await.ok(),
        Reply::Users(users) => {
            let mut out = Vec::new();
            write_status(&mut out, 0).await.ok();
            write_number(&mut out, users.len()).await.ok();
            for (name, addr) in users {
                write_token(&mut out, &name).await.ok();
                write_token(&mut out, &addr.ip).await.ok();
                write_number(&mut out, addr.port).await.ok();
            }
            stream.write_all(&out).await.ok()
        }
        Reply::Content(files) => {
            let mut out = Vec::new();
            write_status(&mut out, 0).await.ok();
            write_number(&mut out, files.len()).await.ok();
            for file in files {
                write_token(&mut out, &file).await.ok();
            }
            stream.write_all(&out).await.ok()
        }
    };
    stream.flush().await?;
    stream.get_mut().shutdown().await
}

enum Reply {
    Status(u8),
    Users(Vec<(String, PeerAddress)>),
    Content(Vec<String>),
}

fn apply(state: &mut DirectoryState, request: &DirectoryRequest, peer: SocketAddr) -> Reply {
    let args = &request.args;
    let user = args[0].as_str();
    let index = state.users.iter().position(|u| u.name == user);

    if request.op == DirectoryOp::Register {
        if index.is_some() {
            return Reply::Status(1);
        }
        state.users.push(MockUser {
            name: user.to_string(),
            ..Default::default()
        });
        return Reply::Status(0);
    }

    let Some(index) = index else {
        return Reply::Status(1);
    };

    match request.op {
        DirectoryOp::Register => unreachable!(),
        DirectoryOp::Unregister => {
            state.users.remove(index);
            Reply::Status(0)
        }
        DirectoryOp::Connect => {
            if state.users[index].online.is_some() {
                return Reply::Status(2);
            }
            let Ok(port) = args[1].parse::<u16>() else {
                return Reply::Status(3);
            };
            state.users[index].online = Some(PeerAddress {
                ip: peer.ip().to_string(),
                port,
            });
            Reply::Status(0)
        }
        _ if state.users[index].online.is_none() => Reply::Status(2),
        DirectoryOp::Disconnect => {
            state.users[index].online = None;
            Reply::Status(0)
        }
        DirectoryOp::Publish => {
            let files = &mut state.users[index].files;
            if files.contains(&args[1]) {
                return Reply::Status(3);
            }
            files.push(args[1].clone());
            Reply::Status(0)
        }
        DirectoryOp::Delete => {
            let files = &mut state.users[index].files;
            match files.iter().position(|f| *f == args[1]) {
                Some(i) => {
                    files.remove(i);
                    Reply::Status(0)
                }
                None => Reply::Status(3),
            }
        }
        DirectoryOp::ListUsers => Reply::Users(
            state
                .users
                .iter()
                .filter_map(|u| u.online.clone().map(|a| (u.name.clone(), a)))
                .collect(),
        ),
        DirectoryOp::ListContent => match state.users.iter().find(|u| u.name == args[1]) {
            Some(target) => Reply::Content(target.files.clone()),
            None => Reply::Status(3),
        },
    }
}

/// Accepts a single connection, consumes one request and answers with
/// `reply` verbatim before closing.
pub async fn spawn_raw_server(reply: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            let mut stream = BufReader::new(socket);
            if read_request(&mut stream).await.is_some() {
                let _ = stream.write_all(&reply).await;
                let _ = stream.flush().await;
                let _ = stream.get_mut().shutdown().await;
            }
        }
    });
    addr
}

/// An address nothing listens on.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
