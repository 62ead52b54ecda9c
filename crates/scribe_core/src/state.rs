use crate::view_model::{AppViewModel, FormatView};

/// Opaque server-issued identifier of a transcription job.
pub type JobId = String;
/// Identifies one upload attempt; a newer attempt supersedes older ones.
pub type AttemptId = u64;
/// Identifies one monitoring run; a stale token means the run was cancelled.
pub type PollToken = u64;

/// MIME type used for transcript retrieval when no format is selected.
pub const DEFAULT_MIME_TYPE: &str = "application/json";

/// Persistent notice shown after a successful email hand-off.
pub const EMAIL_NOTICE: &str =
    "You will receive an email with a download link when transcription is finished.";

/// A downloadable transcript output format offered by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub mime_type: String,
    pub name: String,
    pub icon: String,
}

/// Lifecycle phase of the session's single job, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Uploading,
    Running,
    Complete,
    Failed,
    NotifyRequested,
}

/// The single server-side job this session currently tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub id: JobId,
    pub status: JobStatus,
    pub percent_complete: u8,
    pub message: String,
    pub can_send_email: bool,
}

/// Poll-loop sub-machine.
///
/// `AwaitingStatus` means exactly one status request is outstanding;
/// `WaitingTick` means the next poll is scheduled but not yet due. Both carry
/// the token minted when monitoring started, so ticks and responses from a
/// cancelled run are discarded on receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Idle,
    AwaitingStatus {
        token: PollToken,
    },
    WaitingTick {
        token: PollToken,
    },
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum UploadPhase {
    #[default]
    Idle,
    InFlight {
        attempt: AttemptId,
    },
    Done,
}

/// Bounded progress indicator with a textual label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressBar {
    pub value: u64,
    pub max: u64,
    pub label: String,
}

/// How a status line should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Plain prose.
    Prose,
    /// Preformatted text (granular sub-progress containing a percent sign).
    Preformatted,
    /// Error styling.
    Error,
    /// Persistent notice that outlives the session's polling.
    Notice,
}

/// One line of user-visible status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    pub fn prose(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Prose,
            text: text.into(),
        }
    }

    pub fn preformatted(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Preformatted,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Notice,
            text: text.into(),
        }
    }
}

/// The whole session: format catalog, upload phase, the single active job and
/// its monitor. Owns the supersession counters that make cancellation
/// enforceable without reaching into any timer or transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    formats: Vec<Format>,
    selected_format: Option<usize>,
    formats_error: Option<String>,
    upload: UploadPhase,
    upload_failed: bool,
    upload_bar: ProgressBar,
    upload_result: Option<StatusLine>,
    job: Option<ActiveJob>,
    monitor: MonitorState,
    job_bar: ProgressBar,
    job_status: Option<StatusLine>,
    chooser_visible: bool,
    upload_visible: bool,
    job_visible: bool,
    job_running_visible: bool,
    notification_visible: bool,
    attempt_seq: AttemptId,
    poll_seq: PollToken,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            selected_format: None,
            formats_error: None,
            upload: UploadPhase::Idle,
            upload_failed: false,
            upload_bar: ProgressBar::default(),
            upload_result: None,
            job: None,
            monitor: MonitorState::Idle,
            job_bar: ProgressBar {
                value: 0,
                max: 100,
                label: String::new(),
            },
            job_status: None,
            chooser_visible: true,
            upload_visible: false,
            job_visible: false,
            job_running_visible: false,
            notification_visible: false,
            attempt_seq: 0,
            poll_seq: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            formats: self
                .formats
                .iter()
                .enumerate()
                .map(|(index, format)| FormatView {
                    mime_type: format.mime_type.clone(),
                    name: format.name.clone(),
                    icon: format.icon.clone(),
                    selected: self.selected_format == Some(index),
                })
                .collect(),
            formats_error: self.formats_error.clone(),
            chooser_visible: self.chooser_visible,
            upload_visible: self.upload_visible,
            upload_bar: self.upload_bar.clone(),
            upload_result: self.upload_result.clone(),
            job_visible: self.job_visible,
            job_bar: self.job_bar.clone(),
            job_running_visible: self.job_running_visible,
            job_status: self.job_status.clone(),
            notification_visible: self.notification_visible,
            lifecycle: self.lifecycle(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Session lifecycle phase: the upload attempt before a job id exists,
    /// the job's own status afterwards.
    pub fn lifecycle(&self) -> Option<JobStatus> {
        if matches!(self.upload, UploadPhase::InFlight { .. }) {
            return Some(JobStatus::Uploading);
        }
        if let Some(job) = &self.job {
            return Some(job.status);
        }
        if self.upload_failed {
            return Some(JobStatus::Failed);
        }
        None
    }

    pub(crate) fn set_formats(&mut self, formats: Vec<Format>) {
        self.selected_format = if formats.is_empty() { None } else { Some(0) };
        self.formats = formats;
        self.formats_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_formats_error(&mut self, message: String) {
        self.formats_error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn select_format(&mut self, index: usize) {
        if index < self.formats.len() {
            self.selected_format = Some(index);
            self.mark_dirty();
        }
    }

    /// The checked format's MIME type, read by value at call time.
    pub fn selected_mime_type(&self) -> String {
        self.selected_format
            .and_then(|index| self.formats.get(index))
            .map(|format| format.mime_type.clone())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
    }

    /// Starts a new upload attempt, invalidating any prior job and its
    /// monitoring before the new lifecycle begins.
    pub(crate) fn begin_upload(&mut self) -> AttemptId {
        self.invalidate_polls();
        self.monitor = MonitorState::Idle;
        self.job = None;
        self.job_bar = ProgressBar {
            value: 0,
            max: 100,
            label: String::new(),
        };
        self.job_status = None;
        self.job_visible = false;
        self.job_running_visible = false;
        self.notification_visible = false;

        self.attempt_seq += 1;
        let attempt = self.attempt_seq;
        self.upload = UploadPhase::InFlight { attempt };
        self.upload_failed = false;
        self.upload_bar = ProgressBar::default();
        self.upload_result = Some(StatusLine::prose("Uploading..."));
        self.chooser_visible = false;
        self.upload_visible = true;
        self.mark_dirty();
        attempt
    }

    pub(crate) fn upload_attempt(&self) -> Option<AttemptId> {
        match self.upload {
            UploadPhase::InFlight { attempt } => Some(attempt),
            _ => None,
        }
    }

    pub(crate) fn conclude_upload(&mut self) {
        self.upload = UploadPhase::Done;
    }

    /// Byte-counter progress for the in-flight upload. The visible value
    /// never moves backwards within one attempt.
    pub(crate) fn apply_upload_progress(&mut self, loaded: u64, total: u64) {
        if total == 0 {
            return;
        }
        self.upload_bar.max = total;
        if loaded > self.upload_bar.value {
            self.upload_bar.value = loaded;
        }
        self.upload_bar.label = format!("{}%", self.upload_bar.value * 100 / self.upload_bar.max);
        self.mark_dirty();
    }

    /// Pins the bar to its maximum once an HTTP response has arrived.
    pub(crate) fn pin_upload_bar(&mut self) {
        if self.upload_bar.max == 0 {
            self.upload_bar.max = 100;
        }
        self.upload_bar.value = self.upload_bar.max;
        self.upload_bar.label = "100%".to_string();
        self.mark_dirty();
    }

    /// Transport failure finalization: the bar keeps its last value (or 1 if
    /// it never moved) and the label reads 100% regardless, reflecting that
    /// the operation has terminated.
    pub(crate) fn finalize_upload_bar_on_transport_failure(&mut self) {
        if self.upload_bar.max == 0 {
            self.upload_bar.max = 100;
        }
        if self.upload_bar.value == 0 {
            self.upload_bar.value = 1;
        }
        self.upload_bar.label = "100%".to_string();
        self.mark_dirty();
    }

    pub(crate) fn set_upload_result(&mut self, line: StatusLine) {
        self.upload_result = Some(line);
        self.mark_dirty();
    }

    pub(crate) fn fail_upload(&mut self, line: StatusLine) {
        self.upload_failed = true;
        self.upload_result = Some(line);
        self.mark_dirty();
    }

    pub(crate) fn accept_job(&mut self, id: JobId, can_send_email: bool) {
        self.job = Some(ActiveJob {
            id,
            status: JobStatus::Running,
            percent_complete: 0,
            message: String::new(),
            can_send_email,
        });
        self.notification_visible = can_send_email;
        self.job_visible = true;
        self.mark_dirty();
    }

    /// Mints a fresh monitor token and marks the first status request as
    /// outstanding.
    pub(crate) fn start_monitor(&mut self) -> PollToken {
        self.poll_seq += 1;
        let token = self.poll_seq;
        self.monitor = MonitorState::AwaitingStatus { token };
        token
    }

    /// A scheduled tick fired. Returns the job to poll if the tick is
    /// current and a poll is actually pending, otherwise the tick is stale
    /// and discarded.
    pub(crate) fn begin_poll(&mut self, token: PollToken) -> Option<JobId> {
        match (self.monitor, &self.job) {
            (MonitorState::WaitingTick { token: current }, Some(job)) if current == token => {
                self.monitor = MonitorState::AwaitingStatus { token };
                Some(job.id.clone())
            }
            _ => None,
        }
    }

    pub(crate) fn status_response_is_current(&self, token: PollToken) -> bool {
        self.monitor == MonitorState::AwaitingStatus { token }
    }

    pub(crate) fn await_next_poll(&mut self, token: PollToken) {
        self.monitor = MonitorState::WaitingTick { token };
    }

    pub(crate) fn apply_status_report(&mut self, percent_complete: u8, message: &str, running: bool) {
        self.job_bar = ProgressBar {
            value: u64::from(percent_complete),
            max: 100,
            label: format!("{percent_complete}%"),
        };
        self.job_status = Some(if message.contains('%') {
            StatusLine::preformatted(message)
        } else {
            StatusLine::prose(message)
        });
        self.job_running_visible = running;
        if let Some(job) = &mut self.job {
            job.percent_complete = percent_complete;
            job.message = message.to_string();
        }
        self.mark_dirty();
    }

    /// Terminal success: stop polling, announce completion, restore the file
    /// chooser for the next session.
    pub(crate) fn complete_job(&mut self) -> Option<JobId> {
        self.monitor = MonitorState::Completed;
        self.job_running_visible = false;
        self.job_status = Some(StatusLine::prose("Transcription finished."));
        self.chooser_visible = true;
        self.notification_visible = false;
        self.mark_dirty();
        let job = self.job.as_mut()?;
        job.status = JobStatus::Complete;
        Some(job.id.clone())
    }

    /// Terminal failure: stop polling and surface the reason.
    pub(crate) fn fail_job(&mut self, line: StatusLine) {
        self.monitor = MonitorState::Failed;
        self.job_running_visible = false;
        self.notification_visible = false;
        self.job_status = Some(line);
        if let Some(job) = &mut self.job {
            job.status = JobStatus::Failed;
        }
        self.mark_dirty();
    }

    pub(crate) fn monitor_active(&self) -> bool {
        matches!(
            self.monitor,
            MonitorState::AwaitingStatus { .. } | MonitorState::WaitingTick { .. }
        )
    }

    pub(crate) fn can_request_notification(&self) -> bool {
        self.monitor_active()
            && self
                .job
                .as_ref()
                .is_some_and(|job| job.can_send_email)
    }

    pub(crate) fn job_id(&self) -> Option<JobId> {
        self.job.as_ref().map(|job| job.id.clone())
    }

    /// Email hand-off acknowledged: polling stops for good and the upload UI
    /// returns to its initial state, leaving only the persistent notice.
    pub(crate) fn apply_notify_ack(&mut self, percent_complete: u8) {
        self.job_bar = ProgressBar {
            value: u64::from(percent_complete),
            max: 100,
            label: format!("{percent_complete}%"),
        };
        self.invalidate_polls();
        self.monitor = MonitorState::Cancelled;
        if let Some(job) = &mut self.job {
            job.status = JobStatus::NotifyRequested;
            job.percent_complete = percent_complete;
        }
        self.job_status = Some(StatusLine::notice(EMAIL_NOTICE));
        self.upload = UploadPhase::Idle;
        self.chooser_visible = true;
        self.upload_visible = false;
        self.job_running_visible = false;
        self.notification_visible = false;
        self.mark_dirty();
    }

    pub(crate) fn set_job_status(&mut self, line: StatusLine) {
        self.job_status = Some(line);
        self.mark_dirty();
    }

    /// Any status response or tick still in flight becomes stale.
    fn invalidate_polls(&mut self) {
        self.poll_seq += 1;
    }
}
