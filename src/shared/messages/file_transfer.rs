use super::{extension::Extension, Message};
use crate::codec;

/// A whole file sent from client to server.
///
/// On the wire the file name runs straight into the content with nothing in
/// between: `<base>.<ext><content>\end`. The receiver finds the boundary by
/// splitting at the first `.` and matching a known extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransfer {
    pub base_name: String,
    pub extension: Extension,
    pub content: Vec<u8>,
}

impl FileTransfer {
    pub fn new(base_name: String, extension: Extension, content: Vec<u8>) -> Self {
        Self {
            base_name,
            extension,
            content,
        }
    }

    /// Builds a transfer from a file name already checked by
    /// [`Extension::from_file_name`].
    pub fn from_file_name(file_name: &str, content: Vec<u8>) -> Option<Self> {
        let extension = Extension::from_file_name(file_name)?;
        let base_name = file_name.strip_suffix(extension.as_str())?.strip_suffix('.')?;

        Some(Self::new(base_name.to_string(), extension, content))
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.extension)
    }

    /// Best guess at the file name in a payload that failed to parse, for
    /// error replies.
    pub fn name_hint(payload: &[u8]) -> String {
        let end = payload
            .iter()
            .position(|&b| b == b'.')
            .unwrap_or(payload.len());

        String::from_utf8_lossy(&payload[..end]).into_owned()
    }
}

impl Message for FileTransfer {
    fn to_raw(&self) -> Vec<u8> {
        let mut payload = self.file_name().into_bytes();
        payload.extend_from_slice(&self.content);

        codec::encode(&payload)
    }

    fn from_raw(payload: &[u8]) -> Result<Self, &'static str> {
        let dot = match payload.iter().position(|&b| b == b'.') {
            Some(dot) => dot,
            None => return Err("file name has no extension"),
        };

        let base_name = match std::str::from_utf8(&payload[..dot]) {
            Ok(name) => name,
            Err(_) => return Err("file name is not utf-8"),
        };

        let rest = &payload[dot + 1..];
        let extension = match Extension::match_prefix(rest) {
            Some(ext) => ext,
            None => return Err("unknown file extension"),
        };
        let content = rest[extension.as_str().len()..].to_vec();

        Ok(Self::new(base_name.to_string(), extension, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_name_extension_and_content() {
        let transfer = FileTransfer::from_raw(b"report.cpphello").unwrap();
        assert_eq!(transfer.base_name, "report");
        assert_eq!(transfer.extension, Extension::Cpp);
        assert_eq!(transfer.content, b"hello");
        assert_eq!(transfer.file_name(), "report.cpp");
    }

    #[test]
    fn every_extension_survives_the_wire() {
        for ext in Extension::ALL {
            let name = format!("f.{}", ext);
            let sent = FileTransfer::from_file_name(&name, b"line one\nline two\n".to_vec()).unwrap();

            let raw = sent.to_raw();
            let payload = raw.strip_suffix(codec::TERMINATOR).unwrap();
            let received = FileTransfer::from_raw(payload).unwrap();

            assert_eq!(received, sent, "extension {}", ext);
        }
    }

    #[test]
    fn rejects_payload_without_known_extension() {
        assert!(FileTransfer::from_raw(b"notes.mdhello").is_err());
        assert!(FileTransfer::from_raw(b"no dot at all").is_err());
    }

    #[test]
    fn first_dot_ends_the_base_name() {
        // the client accepts `a.b.txt`, the server cannot place it
        assert!(FileTransfer::from_raw(b"a.b.txthello").is_err());
        assert_eq!(FileTransfer::name_hint(b"a.b.txthello"), "a");
    }

    #[test]
    fn from_file_name_requires_known_extension() {
        assert!(FileTransfer::from_file_name("script.sh", Vec::new()).is_none());
        let transfer = FileTransfer::from_file_name("Main.java", Vec::new()).unwrap();
        assert_eq!(transfer.base_name, "Main");
    }
}
