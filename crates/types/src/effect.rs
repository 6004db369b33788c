//! Effects requested by the workflow and the values exchanged with its shell.
//!
//! The workflow never performs I/O itself. It returns [`Effect`]s, the shell
//! executes them and feeds results back as [`ServiceReply`] or
//! [`SubmissionFailure`].

use crate::{ArtifactHandle, SelectedFile, StratifyOption};

/// Everything the shell needs to issue one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Monotonic attempt counter, for logging only.
    pub attempt: u64,
    pub file: SelectedFile,
    pub stratify: StratifyOption,
}

/// Raw success response from the processing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    pub body: Vec<u8>,
    /// Verbatim `Content-Disposition` header value, when the server sent one.
    pub content_disposition: Option<String>,
}

/// Why a submission did not produce an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// The request never completed. Carries the transport's own message.
    Transport(String),
    /// The service answered with a failure status. `error` is the structured
    /// `error` field of the body when one could be parsed.
    Service { status: u16, error: Option<String> },
}

/// Distinguishes the single automatic save from user-requested repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Automatic,
    Manual,
}

/// Side effects requested by workflow transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the picked file and post it to the service.
    Submit(SubmissionRequest),
    /// Write the artifact behind `handle` to the download directory.
    SaveArtifact {
        handle: ArtifactHandle,
        file_name: String,
        trigger: SaveTrigger,
    },
}
