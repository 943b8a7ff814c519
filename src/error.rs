use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Everything that can go wrong while graphing a project.
///
/// The subprocess and decoding variants are structural and abort the unit
/// they occur in. The POM and origin variants are recoverable: callers log
/// them and drop the offending dependency, reference or symbol.
#[derive(Error, Debug)]
pub enum JavelinError {
    #[error("config error: {0}")]
    Config(String),

    #[error("`{command}` exited with {status}")]
    Subprocess { command: String, status: ExitStatus },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed POM: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("no JAR file at {0}")]
    NoJar(String),

    #[error("no POM file at {}", .0.display())]
    NoPom(PathBuf),

    #[error("POM has no SCM URL")]
    NoScmUrl,

    #[error("POM SCM URL is invalid: {0:?}")]
    InvalidScmUrl(String),

    #[error("cannot parse VCS URL {0:?}")]
    VcsUrl(String),

    #[error("failed to find repo for symbol origin {0:?}")]
    UnresolvedOrigin(String),

    #[error("unknown Java symbol kind {0:?}")]
    UnknownSymbolKind(String),
}

pub type Result<T> = std::result::Result<T, JavelinError>;
