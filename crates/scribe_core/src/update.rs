use crate::effect::{Effect, POLL_DELAY_MS};
use crate::msg::{Msg, Reply};
use crate::state::{AppState, StatusLine};

/// Initial state plus the effects that fire at startup: the format catalog
/// loads independently of everything else.
pub fn init() -> (AppState, Vec<Effect>) {
    (AppState::new(), vec![Effect::LoadFormats])
}

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FormatsLoaded(reply) => {
            match reply {
                Reply::Ok(formats) => state.set_formats(formats),
                Reply::ServerError { message, .. } => state.set_formats_error(message),
                Reply::ProtocolError { status, body } => {
                    state.set_formats_error(format!("Status: {status}\n{body}"));
                }
                Reply::TransportError { .. } => {
                    state.set_formats_error("Could not retrieve the list of formats.".to_string());
                }
            }
            // No retry: the catalog is a one-shot load.
            Vec::new()
        }
        Msg::FormatSelected { index } => {
            state.select_format(index);
            Vec::new()
        }
        Msg::FileChosen { file_name } => {
            if !is_wav_filename(&file_name) {
                return (
                    state,
                    vec![Effect::Alert {
                        message: "Please select a .wav file.".to_string(),
                    }],
                );
            }
            let attempt = state.begin_upload();
            vec![Effect::StartUpload { attempt, file_name }]
        }
        Msg::UploadProgressed {
            attempt,
            loaded,
            total,
        } => {
            if state.upload_attempt() == Some(attempt) {
                state.apply_upload_progress(loaded, total);
            }
            Vec::new()
        }
        Msg::UploadFinished { attempt, reply } => {
            if state.upload_attempt() != Some(attempt) {
                // A newer attempt superseded this one; the late result is
                // received and discarded.
                return (state, Vec::new());
            }
            state.conclude_upload();
            match reply {
                Reply::Ok(ack) => {
                    state.pin_upload_bar();
                    state.set_upload_result(StatusLine::prose(ack.message));
                    state.accept_job(ack.job_id.clone(), ack.can_send_email);
                    // The first poll goes out immediately; only subsequent
                    // ones wait for the delay.
                    let token = state.start_monitor();
                    vec![Effect::RequestStatus {
                        token,
                        job_id: ack.job_id,
                    }]
                }
                Reply::ServerError { message, .. } => {
                    state.pin_upload_bar();
                    state.fail_upload(StatusLine::error(message));
                    Vec::new()
                }
                Reply::ProtocolError { status, body } => {
                    state.pin_upload_bar();
                    state.fail_upload(StatusLine::error(format!("Status: {status}\n{body}")));
                    Vec::new()
                }
                Reply::TransportError { .. } => {
                    state.finalize_upload_bar_on_transport_failure();
                    state.fail_upload(StatusLine::error("Upload failed."));
                    Vec::new()
                }
            }
        }
        Msg::PollDue { token } => match state.begin_poll(token) {
            Some(job_id) => vec![Effect::RequestStatus { token, job_id }],
            None => Vec::new(),
        },
        Msg::StatusReceived { token, reply } => {
            if !state.status_response_is_current(token) {
                return (state, Vec::new());
            }
            match reply {
                Reply::Ok(report) => {
                    state.apply_status_report(
                        report.percent_complete,
                        &report.message,
                        report.running,
                    );
                    if report.running {
                        // Sequential poll: the next tick is scheduled only
                        // now that this response is fully handled.
                        state.await_next_poll(token);
                        vec![Effect::SchedulePoll {
                            token,
                            delay_ms: POLL_DELAY_MS,
                        }]
                    } else {
                        match state.complete_job() {
                            Some(job_id) => vec![Effect::FetchTranscript {
                                mime_type: state.selected_mime_type(),
                                job_id,
                            }],
                            None => Vec::new(),
                        }
                    }
                }
                Reply::ServerError { message, .. } => {
                    state.fail_job(StatusLine::error(message));
                    Vec::new()
                }
                Reply::ProtocolError { status, body } => {
                    state.fail_job(StatusLine::error(format!("Status: {status}\n{body}")));
                    Vec::new()
                }
                Reply::TransportError { .. } => {
                    state.fail_job(StatusLine::error("Could not retrieve the job status."));
                    Vec::new()
                }
            }
        }
        Msg::NotifyClicked { email } => {
            if !state.can_request_notification() {
                return (state, Vec::new());
            }
            if !is_valid_email(&email) {
                return (
                    state,
                    vec![Effect::Alert {
                        message: "Please enter a valid email address.".to_string(),
                    }],
                );
            }
            match state.job_id() {
                Some(job_id) => vec![Effect::SendNotification {
                    mime_type: state.selected_mime_type(),
                    job_id,
                    email,
                }],
                None => Vec::new(),
            }
        }
        Msg::NotifyFinished { reply } => {
            if !state.monitor_active() {
                return (state, Vec::new());
            }
            match reply {
                Reply::Ok(report) => {
                    state.apply_notify_ack(report.percent_complete);
                }
                Reply::ServerError { message, .. } => {
                    // Hand-off declined; monitoring continues untouched.
                    state.set_job_status(StatusLine::error(message));
                }
                Reply::ProtocolError { status, body } => {
                    state.set_job_status(StatusLine::error(format!("Status: {status}\n{body}")));
                }
                Reply::TransportError { .. } => {
                    state.set_job_status(StatusLine::error(
                        "Could not request email notification.",
                    ));
                }
            }
            Vec::new()
        }
        Msg::TranscriptStored { outcome } => {
            match outcome {
                Ok(path) => {
                    state.set_job_status(StatusLine::prose(format!("Transcript saved to {path}.")));
                }
                Err(message) => state.set_job_status(StatusLine::error(message)),
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn is_wav_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".wav")
}

/// Syntactic email check shaped after the HTML `input type=email` rule:
/// an atext-ish local part, then `@`, then dot-separated LDH labels.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ".!#$%&'*+/=?^_`{|}~-".contains(c));
    if !local_ok {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}
