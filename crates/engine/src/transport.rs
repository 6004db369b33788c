//! Seam between the workflow and the network.
//!
//! Engines can provide concrete implementations that call HTTP or anything
//! else. The default implementation forwards to [`SplitServiceClient`];
//! tests substitute a recording transport.

use arffsplit_api::SplitServiceClient;
use arffsplit_types::{ServiceReply, StratifyOption, SubmissionFailure, SubmissionRequest};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Post one dataset and return the archive or the failure.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>, stratify: StratifyOption) -> Result<ServiceReply, SubmissionFailure>;
}

#[async_trait]
impl UploadTransport for SplitServiceClient {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>, stratify: StratifyOption) -> Result<ServiceReply, SubmissionFailure> {
        SplitServiceClient::upload(self, file_name, bytes, stratify.as_str())
            .await
            .map_err(|err| {
                warn!(error = %err, "upload failed");
                SubmissionFailure::from(err)
            })
    }
}

/// Result of one submission, tagged with the attempt it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub attempt: u64,
    pub file_name: String,
    pub result: Result<ServiceReply, SubmissionFailure>,
}

/// Read the picked file and hand it to `transport`.
///
/// A file that cannot be read is reported as a transport failure: the
/// request never left the machine.
pub async fn perform_submission(transport: &dyn UploadTransport, request: SubmissionRequest) -> SubmissionOutcome {
    let SubmissionRequest { attempt, file, stratify } = request;
    let result = match tokio::fs::read(&file.path).await {
        Ok(bytes) => {
            debug!(attempt, file = %file.name, size = bytes.len(), %stratify, "uploading");
            transport.upload(&file.name, bytes, stratify).await
        }
        Err(err) => Err(SubmissionFailure::Transport(format!("could not read {}: {}", file.path.display(), err))),
    };
    SubmissionOutcome {
        attempt,
        file_name: file.name,
        result,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::VecDeque, sync::Mutex};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedUpload {
        pub file_name: String,
        pub bytes: Vec<u8>,
        pub stratify: StratifyOption,
    }

    /// Transport that records every call and replays canned results.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub calls: Mutex<Vec<RecordedUpload>>,
        replies: Mutex<VecDeque<Result<ServiceReply, SubmissionFailure>>>,
    }

    impl RecordingTransport {
        pub fn replying(replies: impl IntoIterator<Item = Result<ServiceReply, SubmissionFailure>>) -> Self {
            Self {
                calls: Mutex::default(),
                replies: Mutex::new(replies.into_iter().collect()),
            }
        }

        pub fn calls(&self) -> Vec<RecordedUpload> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UploadTransport for RecordingTransport {
        async fn upload(&self, file_name: &str, bytes: Vec<u8>, stratify: StratifyOption) -> Result<ServiceReply, SubmissionFailure> {
            self.calls.lock().unwrap().push(RecordedUpload {
                file_name: file_name.to_string(),
                bytes,
                stratify,
            });
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SubmissionFailure::Transport("no canned reply".into())))
        }
    }

    pub fn archive(disposition: Option<&str>) -> Result<ServiceReply, SubmissionFailure> {
        Ok(ServiceReply {
            body: b"PK\x03\x04".to_vec(),
            content_disposition: disposition.map(str::to_owned),
        })
    }
}
