use std::fmt;

use super::Message;
use crate::codec;

/// Server's answer to a [`FileTransfer`](super::file_transfer::FileTransfer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Received(String),
    Overwritten(String),
    ErrorReceiving(String),
}

impl FileStatus {
    pub fn file_name(&self) -> &str {
        match self {
            FileStatus::Received(name)
            | FileStatus::Overwritten(name)
            | FileStatus::ErrorReceiving(name) => name,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Received(name) => write!(f, "file {} received", name),
            FileStatus::Overwritten(name) => write!(f, "file {} overwritten", name),
            FileStatus::ErrorReceiving(name) => write!(f, "error receiving file {}", name),
        }
    }
}

impl Message for FileStatus {
    fn to_raw(&self) -> Vec<u8> {
        codec::encode(format!("{}\n", self).as_bytes())
    }

    fn from_raw(payload: &[u8]) -> Result<Self, &'static str> {
        let text = match std::str::from_utf8(payload) {
            Ok(text) => text.trim_end_matches('\n'),
            Err(_) => return Err("status is not utf-8"),
        };

        if let Some(name) = text.strip_prefix("error receiving file ") {
            return Ok(FileStatus::ErrorReceiving(name.to_string()));
        }

        let name = match text.strip_prefix("file ") {
            Some(rest) => rest,
            None => return Err("not a file status"),
        };
        if let Some(name) = name.strip_suffix(" received") {
            Ok(FileStatus::Received(name.to_string()))
        } else if let Some(name) = name.strip_suffix(" overwritten") {
            Ok(FileStatus::Overwritten(name.to_string()))
        } else {
            Err("not a file status")
        }
    }
}
