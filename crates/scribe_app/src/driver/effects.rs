use std::path::PathBuf;
use std::time::Duration;

use scribe_core::{Effect, Format, Msg, Reply, StatusReport, UploadAck};
use scribe_engine::{ApiReply, EngineEvent, EngineHandle};
use scribe_logging::{client_info, client_warn};

/// Executes core effects against the engine and drains its events.
pub struct EffectRunner {
    engine: EngineHandle,
    wav_path: PathBuf,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, wav_path: PathBuf) -> Self {
        Self { engine, wav_path }
    }

    pub fn try_recv_event(&self) -> Option<EngineEvent> {
        self.engine.try_recv()
    }

    pub fn run_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run(effect);
        }
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::LoadFormats => self.engine.load_formats(),
            Effect::StartUpload { attempt, file_name } => {
                client_info!("uploading {} ({})", file_name, self.wav_path.display());
                self.engine.start_upload(attempt, self.wav_path.clone());
            }
            Effect::RequestStatus { token, job_id } => {
                self.engine.request_status(token, job_id);
            }
            Effect::SchedulePoll { token, delay_ms } => {
                self.engine
                    .schedule_poll(token, Duration::from_millis(delay_ms));
            }
            Effect::FetchTranscript { job_id, mime_type } => {
                self.engine.fetch_transcript(job_id, mime_type);
            }
            Effect::SendNotification {
                job_id,
                email,
                mime_type,
            } => {
                self.engine.send_notification(job_id, email, mime_type);
            }
            Effect::Alert { message } => {
                // Alerts terminate the run before reaching the runner; this
                // arm only exists so nothing is ever silently dropped.
                client_warn!("alert: {}", message);
            }
        }
    }
}

/// Maps an engine event onto the core message it drives. Core and engine
/// keep separate types on purpose; this is the only place they meet.
pub fn msg_for_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FormatsLoaded(reply) => Msg::FormatsLoaded(map_reply(reply, |formats| {
            formats.into_iter().map(map_format).collect()
        })),
        EngineEvent::UploadProgress {
            attempt,
            loaded,
            total,
        } => Msg::UploadProgressed {
            attempt,
            loaded,
            total,
        },
        EngineEvent::UploadFinished { attempt, reply } => Msg::UploadFinished {
            attempt,
            reply: map_reply(reply, map_ack),
        },
        EngineEvent::PollDue { token } => Msg::PollDue { token },
        EngineEvent::StatusReceived { token, reply } => Msg::StatusReceived {
            token,
            reply: map_reply(reply, map_report),
        },
        EngineEvent::NotifyFinished { reply } => Msg::NotifyFinished {
            reply: map_reply(reply, map_report),
        },
        EngineEvent::TranscriptStored { outcome, .. } => Msg::TranscriptStored {
            outcome: outcome.map(|path| path.display().to_string()),
        },
    }
}

fn map_reply<T, U>(reply: ApiReply<T>, f: impl FnOnce(T) -> U) -> Reply<U> {
    match reply {
        ApiReply::Ok(value) => Reply::Ok(f(value)),
        ApiReply::Server { status, message } => Reply::ServerError { status, message },
        ApiReply::Protocol { status, body } => Reply::ProtocolError { status, body },
        ApiReply::Transport { message } => Reply::TransportError { message },
    }
}

fn map_format(format: scribe_engine::Format) -> Format {
    Format {
        mime_type: format.mime_type,
        name: format.name,
        icon: format.icon,
    }
}

fn map_ack(ack: scribe_engine::UploadAck) -> UploadAck {
    UploadAck {
        message: ack.message,
        job_id: ack.job_id,
        can_send_email: ack.can_send_email,
    }
}

fn map_report(report: scribe_engine::StatusReport) -> StatusReport {
    StatusReport {
        percent_complete: report.percent_complete,
        message: report.message,
        running: report.running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_classes_map_one_to_one() {
        let server: ApiReply<scribe_engine::StatusReport> = ApiReply::Server {
            status: 404,
            message: "Job not found".to_string(),
        };
        assert_eq!(
            map_reply(server, map_report),
            Reply::ServerError {
                status: 404,
                message: "Job not found".to_string(),
            }
        );
    }

    #[test]
    fn poll_ticks_keep_their_token() {
        assert_eq!(
            msg_for_event(EngineEvent::PollDue { token: 9 }),
            Msg::PollDue { token: 9 }
        );
    }

    #[test]
    fn stored_transcripts_carry_the_path_as_text() {
        let msg = msg_for_event(EngineEvent::TranscriptStored {
            job_id: "17".to_string(),
            outcome: Ok(std::path::PathBuf::from("output/transcript-17.txt")),
        });
        match msg {
            Msg::TranscriptStored { outcome } => {
                assert_eq!(outcome.unwrap(), "output/transcript-17.txt");
            }
            other => panic!("unexpected msg {other:?}"),
        }
    }
}
