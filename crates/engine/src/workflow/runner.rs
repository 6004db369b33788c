//! Sequential effect runner for headless use.
//!
//! The terminal UI interleaves effects with input handling; this runner
//! simply drains them in order, which is what the `upload` subcommand and
//! the tests need.

use std::{collections::VecDeque, path::PathBuf};

use arffsplit_types::{Effect, SaveTrigger, SelectedFile};
use tracing::warn;

use crate::{
    save::{DownloadDirectory, SaveError},
    transport::{UploadTransport, perform_submission},
    workflow::UploadWorkflow,
};

/// What happened to the saves requested during a run.
#[derive(Debug, Default)]
pub struct DriveReport {
    pub saved: Vec<(SaveTrigger, PathBuf)>,
    pub save_failures: Vec<SaveError>,
}

/// Run `effects` to completion against `workflow`.
pub async fn drive_effects(
    workflow: &mut UploadWorkflow,
    effects: Vec<Effect>,
    transport: &dyn UploadTransport,
    downloads: &DownloadDirectory,
) -> DriveReport {
    let mut queue: VecDeque<Effect> = effects.into();
    let mut report = DriveReport::default();

    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Submit(request) => {
                let outcome = perform_submission(transport, request).await;
                queue.extend(workflow.complete(outcome));
            }
            Effect::SaveArtifact {
                handle,
                file_name,
                trigger,
            } => {
                let Some(bytes) = workflow.artifact_bytes(handle) else {
                    report.save_failures.push(SaveError::Released(handle.url()));
                    continue;
                };
                match downloads.save(&file_name, &bytes).await {
                    Ok(path) => report.saved.push((trigger, path)),
                    Err(err) => {
                        warn!(error = %err, "saving archive failed");
                        report.save_failures.push(err);
                    }
                }
            }
        }
    }

    report
}

/// Pick `file` and drive the resulting cycle to a stable state.
pub async fn drive_submission(
    workflow: &mut UploadWorkflow,
    file: SelectedFile,
    transport: &dyn UploadTransport,
    downloads: &DownloadDirectory,
) -> DriveReport {
    let effects = workflow.pick_file(file);
    drive_effects(workflow, effects, transport, downloads).await
}
