// SPDX-License-Identifier: MPL-2.0
use std::path::PathBuf;
use thiserror::Error;

/// Label used in diagnostics when a catalog was parsed from memory.
pub const IN_MEMORY_ORIGIN: &str = "<memory>";

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),

    /// A translation file is structurally invalid. Loading stops at the first
    /// problem so a catalog is never partially built.
    #[error("Parse Error in {}: {reason}", .file.display())]
    Parse { file: PathBuf, reason: String },

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Export Error: {0}")]
    Export(String),

    #[error("Locale Error: {0}")]
    Locale(String),
}

impl Error {
    /// Creates a parse error attributed to `file`.
    pub fn parse(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Returns the offending file for parse errors.
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            Self::Parse { file, .. } => Some(file),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = Error::parse("locales/zh_CN.ts", "missing <source>");
        let msg = err.to_string();
        assert!(msg.contains("locales/zh_CN.ts"));
        assert!(msg.contains("missing <source>"));
        assert_eq!(err.file(), Some(std::path::Path::new("locales/zh_CN.ts")));
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
        assert!(err.file().is_none());
    }

    #[test]
    fn json_error_becomes_export_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Export(_)));
    }
}
