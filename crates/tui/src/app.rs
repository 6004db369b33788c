//! Application state for the terminal UI.
//!
//! `App` wraps the [`UploadWorkflow`] with the bits only the terminal needs:
//! the path being typed, the spinner frame, the last save notice and a
//! read-only view of the theme flag. Input and background results arrive as
//! key events or [`Msg`]s and return the workflow's [`Effect`]s for the
//! runtime to execute.

use std::{path::PathBuf, sync::Arc};

use arffsplit_engine::{DownloadDirectory, SaveError, SubmissionOutcome, UploadTransport, UploadWorkflow};
use arffsplit_types::{Effect, Locale, SaveTrigger, SelectedFile, StratifyOption, SubmissionState};
use arffsplit_util::{ThemeFlag, display_path, expand_tilde};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::input::PathInput;

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Handles shared with background tasks.
pub struct SessionContext {
    pub transport: Arc<dyn UploadTransport>,
    pub downloads: DownloadDirectory,
}

/// Messages delivered to [`App::update`].
#[derive(Debug)]
pub enum Msg {
    /// Periodic UI tick (spinner)
    Tick,
    Resize(u16, u16),
    /// The host color scheme flipped; the flag already holds the new value.
    ThemeChanged,
    SubmissionFinished(SubmissionOutcome),
    SaveFinished {
        trigger: SaveTrigger,
        result: Result<PathBuf, SaveError>,
    },
}

/// Last save result shown under the status region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved(String),
    SaveFailed(String),
}

/// What the status region shows for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    Prompt,
    Processing { frame: &'static str, file_name: String },
    Error { message: String },
    Success { file_name: String, size: usize },
}

pub struct App {
    pub ctx: SessionContext,
    pub workflow: UploadWorkflow,
    pub path_input: PathInput,
    pub notice: Option<Notice>,
    /// Animation frame for the upload spinner
    pub throbber_idx: usize,
    theme: ThemeFlag,
}

impl App {
    pub fn new(ctx: SessionContext, workflow: UploadWorkflow, theme: ThemeFlag) -> Self {
        Self {
            ctx,
            workflow,
            path_input: PathInput::default(),
            notice: None,
            throbber_idx: 0,
            theme,
        }
    }

    pub fn locale(&self) -> Locale {
        self.workflow.locale()
    }

    pub fn is_dark(&self) -> bool {
        self.theme.is_dark()
    }

    pub fn stratify(&self) -> StratifyOption {
        self.workflow.stratify()
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.workflow.is_loading() {
                    self.throbber_idx = (self.throbber_idx + 1) % SPINNER_FRAMES.len();
                }
                Vec::new()
            }
            Msg::Resize(_, _) | Msg::ThemeChanged => Vec::new(),
            Msg::SubmissionFinished(outcome) => {
                self.throbber_idx = 0;
                self.workflow.complete(outcome)
            }
            Msg::SaveFinished { trigger, result } => {
                self.notice = Some(match result {
                    Ok(path) => {
                        debug!(?trigger, path = %path.display(), "save finished");
                        Notice::Saved(display_path(&path))
                    }
                    Err(err) => {
                        warn!(?trigger, error = %err, "saving archive failed");
                        Notice::SaveFailed(err.to_string())
                    }
                });
                Vec::new()
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter if self.workflow.is_loading() => Vec::new(),
            KeyCode::Enter => self.submit_path(),
            KeyCode::Left if !self.workflow.is_loading() => {
                self.workflow.set_stratify(self.stratify().prev());
                Vec::new()
            }
            KeyCode::Right if !self.workflow.is_loading() => {
                self.workflow.set_stratify(self.stratify().next());
                Vec::new()
            }
            KeyCode::Char('d') if control => self.workflow.download_again(),
            KeyCode::Char('u') if control => {
                self.path_input.clear();
                Vec::new()
            }
            KeyCode::Esc => {
                self.path_input.clear();
                Vec::new()
            }
            KeyCode::Backspace => {
                self.path_input.backspace();
                Vec::new()
            }
            KeyCode::Char(c) if !control => {
                self.path_input.insert_char(c);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.path_input.paste(text);
    }

    /// Pick whatever path is typed. A new pick clears the previous notice.
    fn submit_path(&mut self) -> Vec<Effect> {
        if self.path_input.is_empty() {
            return Vec::new();
        }
        let Some(file) = SelectedFile::from_path(expand_tilde(self.path_input.text())) else {
            return Vec::new();
        };
        self.notice = None;
        self.throbber_idx = 0;
        self.workflow.pick_file(file)
    }

    pub fn status_view(&self) -> StatusView {
        match self.workflow.state() {
            SubmissionState::Idle => StatusView::Prompt,
            SubmissionState::Validating { file_name } | SubmissionState::Uploading { file_name } => StatusView::Processing {
                frame: SPINNER_FRAMES[self.throbber_idx % SPINNER_FRAMES.len()],
                file_name: file_name.clone(),
            },
            SubmissionState::Failed { error, .. } => StatusView::Error {
                message: error.message.clone(),
            },
            SubmissionState::Succeeded { artifact, .. } => StatusView::Success {
                file_name: artifact.file_name.clone(),
                size: artifact.size,
            },
        }
    }
}
