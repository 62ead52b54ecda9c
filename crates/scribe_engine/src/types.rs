use std::path::PathBuf;

use serde::Deserialize;

use crate::reply::ApiReply;

/// Opaque server-issued job identifier.
pub type JobId = String;
/// Upload attempt counter, echoed back so stale results can be discarded.
pub type AttemptId = u64;
/// Monitoring-run counter, echoed back so stale ticks can be discarded.
pub type PollToken = u64;

/// One transcript output format offered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub mime_type: String,
    pub name: String,
    pub icon: String,
}

/// Body of a successful upload response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAck {
    pub message: String,
    /// Canonical job identifier; `result` is accepted as a legacy alias.
    #[serde(alias = "result")]
    pub job_id: JobId,
    #[serde(default)]
    pub can_send_email: bool,
    /// Name the server stored the uploaded wav under.
    #[serde(default)]
    pub wav: Option<String>,
}

/// One job status response; also the shape of the notification ack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(default)]
    pub percent_complete: u8,
    pub message: String,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub wav: Option<String>,
}

/// Events the engine reports back to the driving loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FormatsLoaded(ApiReply<Vec<Format>>),
    UploadProgress {
        attempt: AttemptId,
        loaded: u64,
        total: u64,
    },
    UploadFinished {
        attempt: AttemptId,
        reply: ApiReply<UploadAck>,
    },
    PollDue {
        token: PollToken,
    },
    StatusReceived {
        token: PollToken,
        reply: ApiReply<StatusReport>,
    },
    NotifyFinished {
        reply: ApiReply<StatusReport>,
    },
    TranscriptStored {
        job_id: JobId,
        outcome: Result<PathBuf, String>,
    },
}
