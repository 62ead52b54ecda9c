use crate::state::{AttemptId, Format, JobId, PollToken};

/// Classified outcome of one server exchange.
///
/// Every wire interaction lands in exactly one of these, so no handler ever
/// has to intercept a parse failure after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// 2xx with a body of the expected shape.
    Ok(T),
    /// Non-2xx with a structured `{message}` body; shown verbatim.
    ServerError { status: u16, message: String },
    /// A response arrived but its body was not parseable.
    ProtocolError { status: u16, body: String },
    /// The request never produced a response.
    TransportError { message: String },
}

/// Successful upload acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAck {
    pub message: String,
    pub job_id: JobId,
    pub can_send_email: bool,
}

/// One job status response (also the shape of the notification ack).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub percent_complete: u8,
    pub message: String,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The format-listing request finished.
    FormatsLoaded(Reply<Vec<Format>>),
    /// User checked a format selector.
    FormatSelected { index: usize },
    /// User picked a file to transcribe.
    FileChosen { file_name: String },
    /// Upload byte counters advanced for the given attempt.
    UploadProgressed {
        attempt: AttemptId,
        loaded: u64,
        total: u64,
    },
    /// The upload request finished for the given attempt.
    UploadFinished {
        attempt: AttemptId,
        reply: Reply<UploadAck>,
    },
    /// A scheduled poll delay elapsed.
    PollDue { token: PollToken },
    /// The outstanding status request finished.
    StatusReceived {
        token: PollToken,
        reply: Reply<StatusReport>,
    },
    /// User asked for email delivery of the finished transcript.
    NotifyClicked { email: String },
    /// The notification request finished.
    NotifyFinished { reply: Reply<StatusReport> },
    /// Transcript retrieval finished; `Ok` carries where it was stored.
    TranscriptStored { outcome: Result<String, String> },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
