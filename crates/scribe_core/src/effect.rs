use crate::state::{AttemptId, JobId, PollToken};

/// Delay between handling a status response and issuing the next poll.
pub const POLL_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the format catalog.
    LoadFormats,
    /// Transmit the chosen file as a new transcription job.
    StartUpload {
        attempt: AttemptId,
        file_name: String,
    },
    /// Issue one status request for the active job.
    RequestStatus { token: PollToken, job_id: JobId },
    /// Deliver `Msg::PollDue` after the given delay.
    SchedulePoll { token: PollToken, delay_ms: u64 },
    /// Retrieve the finished transcript in the given format.
    FetchTranscript { job_id: JobId, mime_type: String },
    /// Ask the server to email the transcript once finished.
    SendNotification {
        job_id: JobId,
        email: String,
        mime_type: String,
    },
    /// Blocking user-visible alert; raised by client-side validation.
    Alert { message: String },
}
