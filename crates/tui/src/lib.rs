//! # arffsplit TUI
//!
//! Terminal front end for the upload workflow: a path input restricted to
//! `.arff` files, a stratify selector, and a status region that follows the
//! workflow through validation, upload and the automatic save of the
//! returned archive.
//!
//! ## Architecture
//!
//! Functional core, imperative shell. [`app::App`] turns key presses and
//! background results into workflow transitions and returns effects;
//! `cmd` runs those effects as tasks; `ui::runtime` owns the terminal and
//! the event loop that ties them together.

mod app;
mod cmd;
mod input;
mod theme;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use arffsplit_engine::{DownloadDirectory, UploadTransport, UploadWorkflow};
use arffsplit_util::ColorSchemeSignal;

use crate::app::SessionContext;

/// Everything one UI session needs.
pub struct Session {
    ctx: SessionContext,
    workflow: UploadWorkflow,
    color_scheme: Option<ColorSchemeSignal>,
}

impl Session {
    pub fn new(transport: Arc<dyn UploadTransport>, downloads: DownloadDirectory, workflow: UploadWorkflow) -> Self {
        Self {
            ctx: SessionContext { transport, downloads },
            workflow,
            color_scheme: None,
        }
    }

    /// Follow `signal` instead of the environment-backed default.
    pub fn with_color_scheme(mut self, signal: ColorSchemeSignal) -> Self {
        self.color_scheme = Some(signal);
        self
    }
}

/// Runs the terminal UI until the user quits.
///
/// # Errors
///
/// Terminal setup failures (raw mode, alternate screen) and draw errors.
pub async fn run(session: Session) -> Result<()> {
    ui::runtime::run_app(session).await
}
