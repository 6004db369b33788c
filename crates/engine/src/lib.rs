//! # arffsplit engine
//!
//! The engine owns the upload workflow: validating a picked file, turning a
//! submission into an effect for the shell, applying the service's answer,
//! and materializing the returned archive behind a single live handle.
//!
//! ## Architecture
//!
//! - **`workflow`**: the `UploadWorkflow` state machine and a sequential runner
//! - **`artifact`**: the in-memory handle store (one live handle at a time)
//! - **`disposition`**: filename negotiation from `Content-Disposition`
//! - **`transport`**: the network seam and submission helper
//! - **`save`**: writing archives into the download directory
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arffsplit_engine::{DownloadDirectory, UploadWorkflow, drive_submission};
//! use arffsplit_types::SelectedFile;
//!
//! let client = arffsplit_api::SplitServiceClient::new_from_env()?;
//! let mut workflow = UploadWorkflow::default();
//! let file = SelectedFile::from_path("KDDTrain+.arff").unwrap();
//! let report = drive_submission(&mut workflow, file, &client, &DownloadDirectory::resolve(None)).await;
//! println!("{:?}", report.saved);
//! ```

pub mod artifact;
pub mod disposition;
pub mod save;
pub mod transport;
pub mod workflow;

pub use artifact::ArtifactStore;
pub use disposition::{DEFAULT_DOWNLOAD_NAME, filename_from_disposition, resolve_download_name};
pub use save::{DownloadDirectory, SaveError};
pub use transport::{SubmissionOutcome, UploadTransport, perform_submission};
pub use workflow::UploadWorkflow;
pub use workflow::runner::{DriveReport, drive_effects, drive_submission};
