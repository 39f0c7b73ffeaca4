use std::fmt;

/// File types the protocol accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Txt,
    C,
    Cpp,
    Py,
    Tex,
    Java,
}

impl Extension {
    /// Every extension, in the order the client lists them.
    pub const ALL: [Extension; 6] = [
        Extension::Txt,
        Extension::C,
        Extension::Cpp,
        Extension::Py,
        Extension::Tex,
        Extension::Java,
    ];

    /// Order the server tries them in. `cpp` must come before `c`, otherwise
    /// every `.cpp` upload would be stored as `.c` with `pp` prepended.
    pub const SERVER_ORDER: [Extension; 6] = [
        Extension::Cpp,
        Extension::Txt,
        Extension::C,
        Extension::Py,
        Extension::Tex,
        Extension::Java,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Extension::Txt => "txt",
            Extension::C => "c",
            Extension::Cpp => "cpp",
            Extension::Py => "py",
            Extension::Tex => "tex",
            Extension::Java => "java",
        }
    }

    /// Looks up the suffix after the last `.` of `name`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, suffix) = name.rsplit_once('.')?;

        Self::ALL.into_iter().find(|ext| ext.as_str() == suffix)
    }

    /// First extension in [`Self::SERVER_ORDER`] that `rest` starts with.
    pub fn match_prefix(rest: &[u8]) -> Option<Self> {
        Self::SERVER_ORDER
            .into_iter()
            .find(|ext| rest.starts_with(ext.as_str().as_bytes()))
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
