//! `\end`-terminated frame codec over any async byte stream.
//!
//! A frame is the payload followed by the four literal bytes `\end`. There is
//! no length prefix and no escaping, so a payload that itself ends in `\end`
//! at a read boundary is cut short there.
//!
//! Reads never time out. A peer that stays connected without sending keeps
//! [`decode_stream`] waiting indefinitely.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Marker closing every framed message.
pub const TERMINATOR: &[u8] = b"\\end";

/// Bytes requested from the stream per read.
pub const READ_CHUNK: usize = 500;

/// Largest frame, terminator included, accepted by default.
pub const DEFAULT_MAX_FRAME: usize = 64 * 1024;

/// NUL bytes a frame may carry past `max_frame`. C peers send one per message.
const NUL_ALLOWANCE: usize = 1;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("frame exceeds {limit} bytes without a terminator")]
    FrameTooLarge { limit: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One unit read off the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bytes received, terminator stripped.
    pub payload: Vec<u8>,
    /// Whether the terminator was seen. `false` means the peer closed first.
    pub complete: bool,
}

impl Frame {
    /// The peer closed without sending anything.
    pub fn is_closed(&self) -> bool {
        !self.complete && self.payload.is_empty()
    }
}

pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(payload.len() + TERMINATOR.len());
    raw.extend_from_slice(payload);
    raw.extend_from_slice(TERMINATOR);

    raw
}

/// Reads until the accumulated bytes end with [`TERMINATOR`] or the stream
/// reaches end-of-file.
///
/// Peers that write C strings follow each message with a NUL byte. Trailing
/// NULs are ignored when looking for the terminator and NULs at the start of
/// a frame are dropped. Trailing NULs still count towards `max_frame`, past a
/// one byte allowance.
pub async fn decode_stream<R>(reader: &mut R, max_frame: usize) -> Result<Frame, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let amt = reader.read(&mut chunk).await?;
        if amt == 0 {
            buf.truncate(content_end(&buf));
            return Ok(Frame {
                payload: buf,
                complete: false,
            });
        }

        let mut read = &chunk[..amt];
        if buf.is_empty() {
            let start = read.iter().position(|&b| b != 0).unwrap_or(read.len());
            read = &read[start..];
        }
        buf.extend_from_slice(read);

        let end = content_end(&buf);
        if end > max_frame || buf.len() > max_frame + NUL_ALLOWANCE {
            return Err(CodecError::FrameTooLarge { limit: max_frame });
        }
        if buf[..end].ends_with(TERMINATOR) {
            buf.truncate(end - TERMINATOR.len());
            return Ok(Frame {
                payload: buf,
                complete: true,
            });
        }
    }
}

fn content_end(buf: &[u8]) -> usize {
    buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1)
}
