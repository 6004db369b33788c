//! Shared type definitions for the arffsplit client.
//!
//! The types here are deliberately free of I/O so that the workflow engine,
//! the HTTP client and the terminal UI can all agree on one vocabulary:
//! the picked file, the stratify column, the submission state and the
//! effects the state machine asks its shell to perform.

use std::{error::Error, fmt, path::Path, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod effect;
pub mod locale;
pub mod state;

pub use effect::{Effect, SaveTrigger, ServiceReply, SubmissionFailure, SubmissionRequest};
pub use locale::Locale;
pub use state::{ArtifactHandle, DownloadArtifact, ErrorInfo, ErrorKind, SubmissionState};

/// The only file suffix accepted for submission, compared case-insensitively.
pub const ACCEPTED_EXTENSION: &str = ".arff";

/// Categorical column the remote service stratifies the split on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratifyOption {
    #[default]
    ProtocolType,
    Service,
    Flag,
    Class,
}

impl StratifyOption {
    /// Every column understood by the service, in display order.
    pub const ALL: [StratifyOption; 4] = [Self::ProtocolType, Self::Service, Self::Flag, Self::Class];

    /// Wire value sent in the `stratify` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProtocolType => "protocol_type",
            Self::Service => "service",
            Self::Flag => "flag",
            Self::Class => "class",
        }
    }

    /// Next option in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous option in display order, wrapping around.
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for StratifyOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StratifyOption {
    type Err = ParseStratifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s.trim())
            .ok_or_else(|| ParseStratifyError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStratifyError(pub String);

impl fmt::Display for ParseStratifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected: Vec<&str> = StratifyOption::ALL.iter().map(|o| o.as_str()).collect();
        write!(f, "unknown stratify column '{}'; expected one of {}", self.0, expected.join(", "))
    }
}

impl Error for ParseStratifyError {}

/// A file chosen by the user for one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Local path the bytes are read from at submission time.
    pub path: PathBuf,
    /// Display name (final path component).
    pub name: String,
    /// Lowercase suffix after the last `.`, empty when there is none.
    pub extension: String,
}

impl SelectedFile {
    /// Capture a pick from a local path. Returns `None` when the path has no
    /// file name component (for example `/` or `..`).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let name = path.file_name()?.to_string_lossy().into_owned();
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Some(Self {
            path: path.to_path_buf(),
            name,
            extension,
        })
    }

    /// Whether the display name carries the accepted suffix.
    pub fn has_accepted_extension(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(ACCEPTED_EXTENSION)
    }
}
