//! Everything that travels between client and server.

// From client
pub mod exit;
pub mod file_transfer;
pub mod invalid_command;

// From server
pub mod connection_closed;
pub mod disconnect;
pub mod file_status;

pub mod extension;

use connection_closed::ConnectionClosed;
use disconnect::Disconnect;
use exit::Exit;
use file_status::FileStatus;
use file_transfer::FileTransfer;
use invalid_command::InvalidCommand;

pub trait Message {
    /// Exact bytes to write to the socket, terminator included when the
    /// message is framed.
    fn to_raw(&self) -> Vec<u8>;
    /// Parses a decoded payload (terminator already removed).
    fn from_raw(payload: &[u8]) -> Result<Self, &'static str>
    where
        Self: Sized;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMsg {
    Exit(Exit),
    InvalidCommand(InvalidCommand),
    FileTransfer(FileTransfer),
}

impl ClientMsg {
    pub fn to_raw(&self) -> Vec<u8> {
        match self {
            ClientMsg::Exit(msg) => msg.to_raw(),
            ClientMsg::InvalidCommand(msg) => msg.to_raw(),
            ClientMsg::FileTransfer(msg) => msg.to_raw(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMsg {
    ConnectionClosed(ConnectionClosed),
    Disconnect(Disconnect),
    FileStatus(FileStatus),
    /// Anything else; shown to the user as is.
    Text(String),
}

/// Classifies a payload received by the server. Control commands are
/// checked first, anything else has to parse as a file.
pub fn get_msg_from_raw(raw: &[u8]) -> Result<ClientMsg, &'static str> {
    if let Ok(exit) = Exit::from_raw(raw) {
        Ok(ClientMsg::Exit(exit))
    } else if let Ok(invalid) = InvalidCommand::from_raw(raw) {
        Ok(ClientMsg::InvalidCommand(invalid))
    } else {
        FileTransfer::from_raw(raw).map(ClientMsg::FileTransfer)
    }
}

/// Classifies a reply received by the client.
pub fn get_reply_from_raw(raw: &[u8]) -> ServerMsg {
    if let Ok(closed) = ConnectionClosed::from_raw(raw) {
        ServerMsg::ConnectionClosed(closed)
    } else if let Ok(disconnect) = Disconnect::from_raw(raw) {
        ServerMsg::Disconnect(disconnect)
    } else if let Ok(status) = FileStatus::from_raw(raw) {
        ServerMsg::FileStatus(status)
    } else {
        ServerMsg::Text(String::from_utf8_lossy(raw).into_owned())
    }
}
