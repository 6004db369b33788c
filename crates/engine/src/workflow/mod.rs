//! The upload workflow state machine.
//!
//! `UploadWorkflow` is a pure state container: every operation mutates the
//! state synchronously and returns the [`Effect`]s the caller must perform.
//! Network and disk access happen in the shell, which feeds the results back
//! through [`UploadWorkflow::complete`].
//!
//! ```text
//! Idle ──pick──▶ Validating ──bad suffix──▶ Failed
//!                    │
//!                    └──ok──▶ Uploading ──reply──▶ Succeeded (+ SaveArtifact)
//!                                  └──failure──▶ Failed
//! ```
//!
//! `Succeeded` and `Failed` hold until the next pick. A pick while uploading
//! starts a fresh cycle; results of older attempts are still applied when
//! they arrive.

pub mod runner;

use std::sync::Arc;

use arffsplit_types::{
    ArtifactHandle, DownloadArtifact, Effect, ErrorInfo, ErrorKind, Locale, SaveTrigger, SelectedFile, StratifyOption, SubmissionFailure,
    SubmissionRequest, SubmissionState,
};
use tracing::{debug, warn};

use crate::{artifact::ArtifactStore, disposition::resolve_download_name, transport::SubmissionOutcome};

#[derive(Debug)]
pub struct UploadWorkflow {
    state: SubmissionState,
    stratify: StratifyOption,
    locale: Locale,
    artifacts: ArtifactStore,
    attempt: u64,
}

impl UploadWorkflow {
    pub fn new(stratify: StratifyOption, locale: Locale) -> Self {
        Self {
            state: SubmissionState::Idle,
            stratify,
            locale,
            artifacts: ArtifactStore::new(),
            attempt: 0,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// True only while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn stratify(&self) -> StratifyOption {
        self.stratify
    }

    /// Change the column sent with the next submission. An upload already in
    /// flight keeps the value it was started with.
    pub fn set_stratify(&mut self, stratify: StratifyOption) {
        self.stratify = stratify;
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Bytes behind `handle` while it is the live artifact.
    pub fn artifact_bytes(&self, handle: ArtifactHandle) -> Option<Arc<[u8]>> {
        self.artifacts.get(handle)
    }

    /// Start a new cycle for `file`.
    ///
    /// Emits `Effect::Submit` when the name passes the extension policy and
    /// nothing otherwise. Either way the previous error and artifact are gone
    /// when this returns.
    pub fn pick_file(&mut self, file: SelectedFile) -> Vec<Effect> {
        self.transition(SubmissionState::Validating {
            file_name: file.name.clone(),
        });
        self.artifacts.release_all();

        if !file.has_accepted_extension() {
            let error = ErrorInfo::new(ErrorKind::Validation, self.locale.invalid_extension());
            self.transition(SubmissionState::Failed {
                file_name: Some(file.name),
                error,
            });
            return Vec::new();
        }

        self.attempt += 1;
        self.transition(SubmissionState::Uploading {
            file_name: file.name.clone(),
        });
        vec![Effect::Submit(SubmissionRequest {
            attempt: self.attempt,
            file,
            stratify: self.stratify,
        })]
    }

    /// Apply the result of a submission.
    ///
    /// A success materializes a new artifact (releasing any live one first)
    /// and emits exactly one automatic `SaveArtifact`.
    pub fn complete(&mut self, outcome: SubmissionOutcome) -> Vec<Effect> {
        let SubmissionOutcome { attempt, file_name, result } = outcome;
        if attempt != self.attempt || !self.state.is_loading() {
            debug!(attempt, latest = self.attempt, state = self.state.label(), "applying result of an earlier attempt");
        }

        match result {
            Ok(reply) => {
                let download_name = resolve_download_name(reply.content_disposition.as_deref());
                let size = reply.body.len();
                let handle = self.artifacts.create(reply.body);
                let artifact = DownloadArtifact {
                    handle,
                    file_name: download_name.clone(),
                    size,
                };
                self.transition(SubmissionState::Succeeded { file_name, artifact });
                vec![Effect::SaveArtifact {
                    handle,
                    file_name: download_name,
                    trigger: SaveTrigger::Automatic,
                }]
            }
            Err(failure) => {
                self.artifacts.release_all();
                let error = self.error_info(failure);
                warn!(attempt, kind = ?error.kind, message = %error.message, "submission failed");
                self.transition(SubmissionState::Failed {
                    file_name: Some(file_name),
                    error,
                });
                Vec::new()
            }
        }
    }

    /// Repeat the save of the current artifact. Only meaningful in
    /// `Succeeded`; never changes state or creates handles.
    pub fn download_again(&self) -> Vec<Effect> {
        match &self.state {
            SubmissionState::Succeeded { artifact, .. } => vec![Effect::SaveArtifact {
                handle: artifact.handle,
                file_name: artifact.file_name.clone(),
                trigger: SaveTrigger::Manual,
            }],
            _ => Vec::new(),
        }
    }

    /// Release the live artifact at session end.
    pub fn teardown(&mut self) {
        self.artifacts.release_all();
    }

    /// One message per failure: structured service error, then transport
    /// text, then the localized fallback.
    fn error_info(&self, failure: SubmissionFailure) -> ErrorInfo {
        let fallback = self.locale.upload_fallback();
        match failure {
            SubmissionFailure::Service { error: Some(message), .. } if !message.trim().is_empty() => {
                ErrorInfo::new(ErrorKind::Service, message)
            }
            SubmissionFailure::Service { .. } => ErrorInfo::new(ErrorKind::Service, fallback),
            SubmissionFailure::Transport(message) if !message.trim().is_empty() => ErrorInfo::new(ErrorKind::Transport, message),
            SubmissionFailure::Transport(_) => ErrorInfo::new(ErrorKind::Transport, fallback),
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(from = self.state.label(), to = next.label(), "submission state");
        self.state = next;
    }
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new(StratifyOption::default(), Locale::default())
    }
}

impl Drop for UploadWorkflow {
    fn drop(&mut self) {
        self.teardown();
    }
}
