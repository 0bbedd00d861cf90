//! Wire primitives: NUL-terminated UTF-8 tokens and single status bytes.
//!
//! Numbers travel as decimal tokens, so every exchange is self-delimiting.

use crate::constants::{MAX_TOKEN_LEN, TOKEN_TERMINATOR};
use crate::core_protocol::error::CodecError;
use std::fmt::Display;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Writes `token` followed by a single `0x00`.
pub async fn write_token<W>(conn: &mut W, token: &str) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::with_capacity(token.len() + 1);
    frame.extend_from_slice(token.as_bytes());
    frame.push(TOKEN_TERMINATOR);
    conn.write_all(&frame).await?;
    Ok(())
}

/// Reads bytes one at a time up to the terminator.
///
/// Reading from a raw socket issues one syscall per byte; callers reading
/// many tokens wrap the stream in a `BufReader`.
pub async fn read_token<R>(conn: &mut R) -> Result<String, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        if conn.read(&mut byte).await? == 0 {
            return Err(if bytes.is_empty() {
                CodecError::Closed
            } else {
                CodecError::Truncated(bytes.len())
            });
        }
        if byte[0] == TOKEN_TERMINATOR {
            break;
        }
        if bytes.len() + 1 >= MAX_TOKEN_LEN {
            return Err(CodecError::TooLong(MAX_TOKEN_LEN));
        }
        bytes.push(byte[0]);
    }
    Ok(String::from_utf8(bytes)?)
}

pub async fn write_status<W>(conn: &mut W, status: u8) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    conn.write_all(&[status]).await?;
    Ok(())
}

pub async fn read_status<R>(conn: &mut R) -> Result<u8, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    if conn.read(&mut byte).await? == 0 {
        return Err(CodecError::Closed);
    }
    Ok(byte[0])
}

pub async fn write_number<W, N>(conn: &mut W, value: N) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
    N: Display,
{
    write_token(conn, &value.to_string()).await
}

pub async fn read_number<R, N>(conn: &mut R) -> Result<N, CodecError>
where
    R: AsyncRead + Unpin,
    N: FromStr,
{
    let token = read_token(conn).await?;
    // `u64::from_str` accepts a leading '+', the wire format does not.
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidNumber(token));
    }
    token.parse().map_err(|_| CodecError::InvalidNumber(token))
}
