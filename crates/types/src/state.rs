//! Submission state and the values carried by its terminal variants.

use std::fmt;

/// Where a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong file type, detected locally before any request.
    Validation,
    /// The request never completed (connectivity, timeout, local read).
    Transport,
    /// The service answered with a failure status.
    Service,
}

/// The single user-facing error message of a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Address of an in-memory artifact held by the artifact store.
///
/// A handle is only an address: whether the bytes behind it are still live
/// is decided by the store that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(u64);

impl ArtifactHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    /// Object-URL style rendering used in logs and the status region.
    pub fn url(&self) -> String {
        format!("blob:arffsplit/{}", self.0)
    }
}

/// Result of a successful submission: a live handle and the name to save it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub handle: ArtifactHandle,
    pub file_name: String,
    pub size: usize,
}

/// The one authoritative state of the upload workflow.
///
/// Errors and artifacts live inside their variants, so a state that holds
/// both cannot be constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating {
        file_name: String,
    },
    Uploading {
        file_name: String,
    },
    Succeeded {
        file_name: String,
        artifact: DownloadArtifact,
    },
    Failed {
        file_name: Option<String>,
        error: ErrorInfo,
    },
}

impl SubmissionState {
    /// True only while a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uploading { .. })
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        match self {
            Self::Succeeded { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Display name of the file the current state refers to, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Validating { file_name } | Self::Uploading { file_name } | Self::Succeeded { file_name, .. } => Some(file_name),
            Self::Failed { file_name, .. } => file_name.as_deref(),
        }
    }

    /// Short label used by logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating { .. } => "validating",
            Self::Uploading { .. } => "uploading",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_only_while_uploading() {
        assert!(!SubmissionState::Idle.is_loading());
        assert!(SubmissionState::Uploading { file_name: "a.arff".into() }.is_loading());
        let failed = SubmissionState::Failed {
            file_name: None,
            error: ErrorInfo::new(ErrorKind::Transport, "offline"),
        };
        assert!(!failed.is_loading());
        assert_eq!(failed.error().map(|e| e.message.as_str()), Some("offline"));
        assert!(failed.artifact().is_none());
    }

    #[test]
    fn handle_renders_as_object_url() {
        assert_eq!(ArtifactHandle::from_raw(7).url(), "blob:arffsplit/7");
    }
}
