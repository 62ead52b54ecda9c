use crate::state::{JobStatus, ProgressBar, StatusLine};

/// One entry of the format selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatView {
    pub mime_type: String,
    pub name: String,
    pub icon: String,
    pub selected: bool,
}

/// Render snapshot of the whole session. A rendering surface consumes this
/// and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub formats: Vec<FormatView>,
    pub formats_error: Option<String>,
    pub chooser_visible: bool,
    pub upload_visible: bool,
    pub upload_bar: ProgressBar,
    pub upload_result: Option<StatusLine>,
    pub job_visible: bool,
    pub job_bar: ProgressBar,
    pub job_running_visible: bool,
    pub job_status: Option<StatusLine>,
    pub notification_visible: bool,
    pub lifecycle: Option<JobStatus>,
    pub dirty: bool,
}
