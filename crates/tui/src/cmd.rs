//! # Effect execution
//!
//! Boundary between the workflow's pure transitions and the outside world.
//! Each [`Effect`] becomes a background task whose result comes back to the
//! event loop as a [`Msg`]:
//! - `Submit` reads the file and posts it through the session transport
//! - `SaveArtifact` writes the live archive into the download directory
//!
//! Tasks never touch the workflow; only the event loop applies their
//! results.

use std::sync::Arc;

use arffsplit_engine::{SaveError, SubmissionOutcome, perform_submission};
use arffsplit_types::{Effect, SubmissionFailure};
use futures_util::{FutureExt, future::BoxFuture};
use tokio::task::spawn;
use tracing::debug;

use crate::app::{App, Msg};

/// Work produced by one batch of effects.
#[derive(Default)]
pub struct CommandBatch {
    /// Results known without waiting (for example a save of a released handle).
    pub immediate: Vec<Msg>,
    pub pending: Vec<BoxFuture<'static, Msg>>,
}

pub fn run_from_effects(app: &App, effects: Vec<Effect>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for effect in effects {
        match effect {
            Effect::Submit(request) => {
                let transport = Arc::clone(&app.ctx.transport);
                let attempt = request.attempt;
                let file_name = request.file.name.clone();
                debug!(attempt, file = %file_name, "spawning submission");
                let task = spawn(async move { perform_submission(transport.as_ref(), request).await });
                batch.pending.push(
                    task.map(move |joined| {
                        let outcome = joined.unwrap_or_else(|error| SubmissionOutcome {
                            attempt,
                            file_name,
                            result: Err(SubmissionFailure::Transport(format!("upload task failed: {error}"))),
                        });
                        Msg::SubmissionFinished(outcome)
                    })
                    .boxed(),
                );
            }
            Effect::SaveArtifact {
                handle,
                file_name,
                trigger,
            } => {
                let Some(bytes) = app.workflow.artifact_bytes(handle) else {
                    batch.immediate.push(Msg::SaveFinished {
                        trigger,
                        result: Err(SaveError::Released(handle.url())),
                    });
                    continue;
                };
                let downloads = app.ctx.downloads.clone();
                let root = downloads.root().to_path_buf();
                let task = spawn(async move { downloads.save(&file_name, &bytes).await });
                batch.pending.push(
                    task.map(move |joined| Msg::SaveFinished {
                        trigger,
                        result: joined.unwrap_or_else(|error| {
                            Err(SaveError::Io {
                                path: root,
                                source: std::io::Error::other(error.to_string()),
                            })
                        }),
                    })
                    .boxed(),
                );
            }
        }
    }
    batch
}
