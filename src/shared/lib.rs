//! Shared protocol for the textdrop client and server: the `\end` frame
//! codec, the messages both sides exchange, and the per-connection logic of
//! each side.

use std::{error::Error, net::SocketAddr};

use messages::Message;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub mod codec;
pub mod exchange;
pub mod interpreter;
pub mod logger;
pub mod messages;

pub type BoxError = Box<dyn Error + Send + Sync>;

pub async fn send_msg<W, T>(sock: &mut W, msg: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Message,
{
    let msg_raw = msg.to_raw();
    sock.write_all(msg_raw.as_slice()).await?;
    sock.flush().await
}

/// Formats an address as `IPv4 127.0.0.1 51511`.
pub fn addr_to_string(addr: &SocketAddr) -> String {
    let version = if addr.is_ipv4() { 4 } else { 6 };

    format!("IPv{} {} {}", version, addr.ip(), addr.port())
}

/// Port argument parser for both binaries; `0` is refused.
pub fn parse_port(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(0) => Err("port must be between 1 and 65535".to_string()),
        Ok(port) => Ok(port),
        Err(e) => Err(format!("invalid port {:?}: {}", s, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_zero_is_a_usage_error() {
        assert_eq!(parse_port("51511"), Ok(51511));
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
        assert!(parse_port("http").is_err());
    }

    #[test]
    fn describes_both_families() {
        let v4: SocketAddr = "127.0.0.1:51511".parse().unwrap();
        let v6: SocketAddr = "[::1]:51511".parse().unwrap();
        assert_eq!(addr_to_string(&v4), "IPv4 127.0.0.1 51511");
        assert_eq!(addr_to_string(&v6), "IPv6 ::1 51511");
    }
}
