//! Server side: one loop per accepted connection, and the listener that
//! serves connections one after another.

use std::{
    fmt,
    future::Future,
    io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use tokio::{
    fs,
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};

use crate::{
    addr_to_string,
    codec::{self, CodecError, Frame},
    messages::{
        connection_closed::ConnectionClosed, disconnect::Disconnect, file_status::FileStatus,
        file_transfer::FileTransfer, get_msg_from_raw, ClientMsg,
    },
    send_msg, BoxError,
};

/// What a client `exit` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Reply `connection closed`, then stop the whole server.
    StopServer,
    /// Reply `connection closed` and close only that client's connection.
    CloseConnection,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where received files are written.
    pub dir: PathBuf,
    pub max_frame: usize,
    pub exit_policy: ExitPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            max_frame: codec::DEFAULT_MAX_FRAME,
            exit_policy: ExitPolicy::StopServer,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Peer closed its side.
    ClientClosed,
    /// Peer sent `invalid command` and was told to `disconnect`.
    Disconnected,
    /// Peer sent `exit`.
    ExitRequested,
    /// Peer sent a frame larger than the limit.
    Dropped,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SessionEnd::ClientClosed => "closed the connection",
            SessionEnd::Disconnected => "disconnected due to incorrect command",
            SessionEnd::ExitRequested => "requested exit",
            SessionEnd::Dropped => "dropped for sending an oversized frame",
        };
        f.write_str(text)
    }
}

/// One decoded request, after framing has been checked.
#[derive(Debug)]
enum Inbound {
    Closed,
    Exit,
    InvalidCommand,
    Store(FileTransfer),
    /// File payload that cannot be stored; carries the name for the reply.
    Reject(String),
}

impl Inbound {
    fn from_frame(frame: Frame) -> Self {
        if frame.is_closed() {
            return Inbound::Closed;
        }

        let msg = match get_msg_from_raw(&frame.payload) {
            Ok(msg) => msg,
            Err(reason) => {
                debug!("unparseable payload: {}", reason);
                return Inbound::Reject(FileTransfer::name_hint(&frame.payload));
            }
        };

        match msg {
            ClientMsg::Exit(_) if frame.complete => Inbound::Exit,
            ClientMsg::InvalidCommand(_) if frame.complete => Inbound::InvalidCommand,
            ClientMsg::FileTransfer(transfer) if frame.complete => {
                if is_plain_name(&transfer.base_name) {
                    Inbound::Store(transfer)
                } else {
                    Inbound::Reject(transfer.file_name())
                }
            }
            ClientMsg::FileTransfer(transfer) => Inbound::Reject(transfer.file_name()),
            _ => Inbound::Reject(FileTransfer::name_hint(&frame.payload)),
        }
    }
}

/// Base names are written straight into the output directory.
fn is_plain_name(base_name: &str) -> bool {
    !base_name.is_empty() && !base_name.contains(['/', '\\'])
}

/// Serves one client until it closes, disconnects, or asks to exit.
///
/// Every file reply is framed. `connection closed` and `disconnect` are sent
/// bare and the caller is expected to drop the stream right after.
pub async fn handle_connection<S>(
    stream: &mut S,
    config: &ServerConfig,
) -> Result<SessionEnd, BoxError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let frame = match codec::decode_stream(stream, config.max_frame).await {
            Ok(frame) => frame,
            Err(CodecError::FrameTooLarge { limit }) => {
                warn!("frame over {} bytes, dropping client", limit);
                return Ok(SessionEnd::Dropped);
            }
            Err(e) => return Err(e.into()),
        };

        match Inbound::from_frame(frame) {
            Inbound::Closed => return Ok(SessionEnd::ClientClosed),
            Inbound::Exit => {
                info!("connection closed");
                send_msg(stream, &ConnectionClosed).await?;
                return Ok(SessionEnd::ExitRequested);
            }
            Inbound::InvalidCommand => {
                send_msg(stream, &Disconnect).await?;
                return Ok(SessionEnd::Disconnected);
            }
            Inbound::Store(transfer) => {
                let status = store(&config.dir, &transfer).await;
                info!("{}", status);
                send_msg(stream, &status).await?;
            }
            Inbound::Reject(name) => {
                let status = FileStatus::ErrorReceiving(name);
                info!("{}", status);
                send_msg(stream, &status).await?;
            }
        }
    }
}

/// Writes the file, replacing any earlier copy. A write failure becomes an
/// error reply rather than ending the session.
async fn store(dir: &Path, transfer: &FileTransfer) -> FileStatus {
    let name = transfer.file_name();
    let path = dir.join(&name);

    let existed = fs::metadata(&path).await.is_ok();
    if let Err(e) = fs::write(&path, &transfer.content).await {
        warn!("could not write {}: {}", path.display(), e);
        return FileStatus::ErrorReceiving(name);
    }

    if existed {
        FileStatus::Overwritten(name)
    } else {
        FileStatus::Received(name)
    }
}

/// Listening socket plus the settings every session runs with.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(addr: SocketAddr, config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;

        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts and serves clients one at a time until a client `exit` stops
    /// the server (under [`ExitPolicy::StopServer`]) or `shutdown` resolves.
    ///
    /// While a client is being served, further connections wait in the
    /// listen backlog.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), BoxError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            info!("waiting for new client");
            let (mut stream, peer) = tokio::select! {
                accepted = self.listener.accept() => accepted?,
                () = &mut shutdown => {
                    info!("shutting down");
                    return Ok(());
                }
            };
            let peer = addr_to_string(&peer);
            info!("connected from {}", peer);

            let end = tokio::select! {
                end = handle_connection(&mut stream, &self.config) => end,
                () = &mut shutdown => {
                    info!("shutting down, dropping {}", peer);
                    return Ok(());
                }
            };

            match end {
                Ok(SessionEnd::ExitRequested) if self.config.exit_policy == ExitPolicy::StopServer => {
                    info!("{} requested exit, stopping server", peer);
                    return Ok(());
                }
                Ok(end) => info!("{} {}", peer, end),
                Err(e) => warn!("{}: {}", peer, e),
            }
        }
    }
}
