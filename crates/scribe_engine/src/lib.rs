//! Scribe engine: HTTP client, poll timer and transcript persistence.
mod api;
mod engine;
mod filename;
mod persist;
mod reply;
mod types;
mod upload;

pub use api::{ClientError, ClientSettings, HttpApi, TranscriptionApi};
pub use engine::{EngineConfig, EngineHandle};
pub use filename::{extension_for_mime, transcript_filename};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use reply::{classify, ApiReply};
pub use types::{AttemptId, EngineEvent, Format, JobId, PollToken, StatusReport, UploadAck};
pub use upload::{ChannelProgressSink, ProgressSink};
