//! Scribe core: pure job-lifecycle state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, POLL_DELAY_MS};
pub use msg::{Msg, Reply, StatusReport, UploadAck};
pub use state::{
    ActiveJob, AppState, AttemptId, Format, JobId, JobStatus, MonitorState, PollToken,
    ProgressBar, StatusKind, StatusLine, DEFAULT_MIME_TYPE, EMAIL_NOTICE,
};
pub use update::{init, update};
pub use view_model::{AppViewModel, FormatView};
