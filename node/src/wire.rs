//! Length-prefixed message framing.
//!
//! Each frame is the network magic (4 bytes, little-endian), the body length
//! (4 bytes, big-endian) and a bincode-encoded [`Message`].

use std::io;

use peerchain_messages::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest body accepted from a peer (32 MiB).
pub const MAX_FRAME_SIZE: usize = 32 * 1024 * 1024;

pub fn encode_frame(magic: u32, message: &Message) -> io::Result<Vec<u8>> {
    let body =
        bincode::serialize(message).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if body.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message too large: {} > {MAX_FRAME_SIZE}", body.len()),
        ));
    }
    let mut frame = Vec::with_capacity(8 + body.len());
    frame.extend_from_slice(&magic.to_le_bytes());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    magic: u32,
    message: &Message,
) -> io::Result<()> {
    let frame = encode_frame(magic, message)?;
    writer.write_all(&frame).await?;
    writer.flush().await
}

/// Read one frame. A foreign magic or an oversized body is `InvalidData`.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R, magic: u32) -> io::Result<Message> {
    let mut head = [0u8; 8];
    reader.read_exact(&mut head).await?;

    let found = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
    if found != magic {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("wrong network magic {found:#010x}"),
        ));
    }

    let body_len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;
    if body_len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message too large: {body_len} > {MAX_FRAME_SIZE}"),
        ));
    }

    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body).await?;
    bincode::deserialize(&body).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
