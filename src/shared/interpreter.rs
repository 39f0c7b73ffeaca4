//! Client side: turns typed commands into messages and shows the replies.

use std::{
    fmt, io,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;
use tokio::{
    fs,
    io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt},
};

use crate::{
    codec::{self, TERMINATOR},
    messages::{
        exit::Exit, extension::Extension, file_transfer::FileTransfer, get_reply_from_raw,
        invalid_command::InvalidCommand, ClientMsg, ServerMsg,
    },
    BoxError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(String),
    NotFound(String),
    /// The name has no `.` at all.
    NoExtension(String),
    BadExtension(String),
    NoFileGiven,
}

impl fmt::Display for SelectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectOutcome::Selected(name) => write!(f, "{} selected", name),
            SelectOutcome::NotFound(name) => write!(f, "{} does not exist", name),
            SelectOutcome::NoExtension(name) => write!(f, "{} is not valid!", name),
            SelectOutcome::BadExtension(name) => write!(f, "{} not valid!", name),
            SelectOutcome::NoFileGiven => f.write_str("no file selected!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    NoSelection,
    /// The selected file disappeared after it was selected.
    Gone(String),
    TooLarge(String),
    /// Present but cannot be read, e.g. a directory or no permission.
    Unreadable(String),
    Ready(FileTransfer),
}

/// Result of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print this and read the next line; nothing goes over the network.
    Local(String),
    /// Send this and wait for the server's reply.
    Transmit(ClientMsg),
}

/// Holds the one piece of session state the client has: the file picked by
/// the last successful `select file`.
#[derive(Debug)]
pub struct Interpreter {
    selected: Option<PathBuf>,
    max_frame: usize,
}

impl Interpreter {
    pub fn new(max_frame: usize) -> Self {
        Self {
            selected: None,
            max_frame,
        }
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub async fn handle_select(&mut self, name: &str) -> SelectOutcome {
        if name.is_empty() {
            return SelectOutcome::NoFileGiven;
        }
        if fs::metadata(name).await.is_err() {
            return SelectOutcome::NotFound(name.to_string());
        }
        if !name.contains('.') {
            return SelectOutcome::NoExtension(name.to_string());
        }
        if Extension::from_file_name(name).is_none() {
            return SelectOutcome::BadExtension(name.to_string());
        }

        self.selected = Some(PathBuf::from(name));
        SelectOutcome::Selected(name.to_string())
    }

    /// Reads the selected file and builds the request for it. The selection
    /// stays in place so the same file can be sent again.
    pub async fn handle_send(&mut self) -> SendOutcome {
        let path = match &self.selected {
            Some(path) => path.clone(),
            None => return SendOutcome::NoSelection,
        };
        let shown = path.display().to_string();

        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(_) => {
                self.selected = None;
                return SendOutcome::Gone(shown);
            }
        };

        // only the last component travels, the server writes into one directory
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let overhead = (file_name.len() + TERMINATOR.len()) as u64;
        if meta.len().saturating_add(overhead) > self.max_frame as u64 {
            return SendOutcome::TooLarge(shown);
        }

        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("reading {} failed: {}", shown, e);
                return SendOutcome::Unreadable(shown);
            }
        };

        let transfer = match FileTransfer::from_file_name(&file_name, content) {
            Some(transfer) => transfer,
            None => {
                self.selected = None;
                return SendOutcome::Gone(shown);
            }
        };

        // the file may have grown since it was stat'ed
        let frame_len = file_name.len() + transfer.content.len() + TERMINATOR.len();
        if frame_len > self.max_frame {
            return SendOutcome::TooLarge(shown);
        }

        SendOutcome::Ready(transfer)
    }

    pub fn handle_exit(&mut self) -> ClientMsg {
        ClientMsg::Exit(Exit)
    }

    pub async fn handle_line(&mut self, line: &str) -> Action {
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

        if let Some(name) = parse_select(line) {
            let outcome = self.handle_select(name).await;
            return Action::Local(outcome.to_string());
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["send", "file"] => match self.handle_send().await {
                SendOutcome::NoSelection => Action::Local("no file selected!".to_string()),
                SendOutcome::Gone(name) => Action::Local(format!("{} does not exist", name)),
                SendOutcome::TooLarge(name) => Action::Local(format!("{} is too large", name)),
                SendOutcome::Unreadable(name) => Action::Local(format!("{} cannot be read", name)),
                SendOutcome::Ready(transfer) => Action::Transmit(ClientMsg::FileTransfer(transfer)),
            },
            ["exit"] => Action::Transmit(self.handle_exit()),
            _ => Action::Transmit(ClientMsg::InvalidCommand(InvalidCommand)),
        }
    }
}

/// `select file <name>`: returns the trimmed rest of the line after the two
/// keywords, possibly empty.
fn parse_select(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("select")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let rest = rest.trim_start().strip_prefix("file")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some(rest.trim())
}

/// How a client session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEnd {
    /// Input ran out; the connection was closed from this side.
    InputClosed,
    /// Server answered `disconnect`.
    Disconnected,
    /// Server answered `connection closed`.
    ConnectionClosed,
}

/// Reads commands from `input` until one of them ends the session. Every
/// transmission waits for exactly one reply.
pub async fn run_session<S, I, W>(
    stream: &mut S,
    mut input: I,
    out: &mut W,
    mut interpreter: Interpreter,
) -> Result<ClientEnd, BoxError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut line = String::new();

    loop {
        line.clear();
        if input.read_line(&mut line).await? == 0 {
            debug!("input closed");
            stream.shutdown().await?;
            return Ok(ClientEnd::InputClosed);
        }

        let msg = match interpreter.handle_line(&line).await {
            Action::Local(text) => {
                writeln!(out, "{}", text)?;
                continue;
            }
            Action::Transmit(msg) => msg,
        };

        stream.write_all(&msg.to_raw()).await?;
        stream.flush().await?;

        let reply = codec::decode_stream(stream, interpreter.max_frame).await?;
        if reply.is_closed() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            )
            .into());
        }

        match get_reply_from_raw(&reply.payload) {
            ServerMsg::Disconnect(_) => {
                writeln!(out, "disconnected due to incorrect command")?;
                return Ok(ClientEnd::Disconnected);
            }
            ServerMsg::ConnectionClosed(_) => {
                writeln!(out, "connection closed")?;
                return Ok(ClientEnd::ConnectionClosed);
            }
            ServerMsg::FileStatus(_) | ServerMsg::Text(_) => {
                write!(out, "{}", String::from_utf8_lossy(&reply.payload))?;
                out.flush()?;
            }
        }
    }
}
