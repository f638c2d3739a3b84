use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reader position in a settings document, for diagnostics.
///
/// Line numbers are 1-indexed, columns are 0-indexed character positions
/// within the line. `path` is `None` for documents parsed from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPosition {
    pub path: Option<PathBuf>,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for XmlPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}:{}", path.display(), self.line, self.column),
            None => write!(f, "<string>:{}:{}", self.line, self.column),
        }
    }
}

/// Errors raised while loading a settings schema.
///
/// `File` means a document could not be opened or read; on a mandatory
/// include it aborts the load, on an optional include it is caught at the
/// resolution site. `Xml` is a structural violation and always aborts.
#[derive(Error, Debug)]
pub enum SettingsXmlError {
    #[error("Failed to read settings file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("XML error at {position}: {message}")]
    Xml {
        position: XmlPosition,
        message: String,
    },

    #[error("Cyclic include of {}: already being loaded via {}", .path.display(), format_chain(.chain))]
    CyclicInclude { path: PathBuf, chain: Vec<PathBuf> },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, SettingsXmlError>;
