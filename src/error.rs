use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::version::SchemaDialect;

pub type Result<T> = std::result::Result<T, PackageError>;

/// Stable tag for each failure class, so callers can branch without matching
/// on the error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedVersion,
    InvalidConfig,
    Io,
    DefinitionFileMissing,
}

#[derive(Error, Debug)]
pub enum PackageError {
    /// The requested SCORM version is not in the version table.
    #[error("Unsupported SCORM version '{version}'. Supported versions:\n{}", .supported.join("\n"))]
    UnsupportedVersion {
        version: String,
        supported: Vec<&'static str>,
    },

    #[error("Invalid package configuration: {0}")]
    InvalidConfig(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A bundled schema file for the dialect is not present on disk.
    #[error("Definition file {} for {dialect} is missing", .path.display())]
    DefinitionFileMissing {
        dialect: SchemaDialect,
        path: PathBuf,
    },

    #[error("Failed to write archive: {0}")]
    Archive(String),
}

impl PackageError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        PackageError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PackageError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            PackageError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            PackageError::Io { .. } | PackageError::Archive(_) => ErrorKind::Io,
            PackageError::DefinitionFileMissing { .. } => ErrorKind::DefinitionFileMissing,
        }
    }
}

impl From<zip::result::ZipError> for PackageError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(source) => PackageError::io("In writing the zip archive", source),
            other => PackageError::Archive(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for PackageError {
    fn from(e: walkdir::Error) -> Self {
        let context = match e.path() {
            Some(p) => format!("Failed to walk {}", p.display()),
            None => "Failed to walk directory".to_string(),
        };
        PackageError::io(context, e.into())
    }
}
