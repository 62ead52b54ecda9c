use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use scribe_logging::{client_debug, client_info, client_warn};

use crate::api::{ClientError, ClientSettings, HttpApi, TranscriptionApi};
use crate::filename::transcript_filename;
use crate::persist::AtomicFileWriter;
use crate::reply::ApiReply;
use crate::types::{AttemptId, EngineEvent, JobId, PollToken};
use crate::upload::{ChannelProgressSink, ProgressSink};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub settings: ClientSettings,
}

enum EngineCommand {
    LoadFormats,
    StartUpload {
        attempt: AttemptId,
        wav_path: PathBuf,
    },
    RequestStatus {
        token: PollToken,
        job_id: JobId,
    },
    SchedulePoll {
        token: PollToken,
        delay: Duration,
    },
    FetchTranscript {
        job_id: JobId,
        mime_type: String,
    },
    SendNotification {
        job_id: JobId,
        email: String,
        mime_type: String,
    },
}

/// Command/event handle to the IO engine. Commands are executed on a
/// dedicated runtime thread; events are drained with `try_recv`.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ClientError> {
        // Fail fast on a bad server URL, before any thread exists.
        let api = Arc::new(HttpApi::new(&config.server_url, config.settings.clone())?);
        let writer = Arc::new(AtomicFileWriter::new(config.output_dir));
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), &writer, command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn load_formats(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadFormats);
    }

    pub fn start_upload(&self, attempt: AttemptId, wav_path: PathBuf) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartUpload { attempt, wav_path });
    }

    pub fn request_status(&self, token: PollToken, job_id: JobId) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::RequestStatus { token, job_id });
    }

    pub fn schedule_poll(&self, token: PollToken, delay: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::SchedulePoll { token, delay });
    }

    pub fn fetch_transcript(&self, job_id: JobId, mime_type: String) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::FetchTranscript { job_id, mime_type });
    }

    pub fn send_notification(&self, job_id: JobId, email: String, mime_type: String) {
        let _ = self.cmd_tx.send(EngineCommand::SendNotification {
            job_id,
            email,
            mime_type,
        });
    }
}

async fn handle_command(
    api: &dyn TranscriptionApi,
    writer: &AtomicFileWriter,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::LoadFormats => {
            let reply = api.list_formats().await;
            if let ApiReply::Ok(formats) = &reply {
                for format in formats {
                    client_debug!(
                        "format {} ({}) icon {}",
                        format.name,
                        format.mime_type,
                        api.icon_url(&format.icon)
                    );
                }
            }
            client_info!("listformats: {}", reply.class());
            let _ = event_tx.send(EngineEvent::FormatsLoaded(reply));
        }
        EngineCommand::StartUpload { attempt, wav_path } => {
            client_info!("upload attempt {} of {}", attempt, wav_path.display());
            let sink: Arc<dyn ProgressSink> =
                Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let reply = api.start_transcription(attempt, &wav_path, sink).await;
            if let ApiReply::Ok(ack) = &reply {
                if let Some(wav) = &ack.wav {
                    client_debug!("server stored wav as {}", wav);
                }
            }
            client_info!("starttranscription: {}", reply.class());
            let _ = event_tx.send(EngineEvent::UploadFinished { attempt, reply });
        }
        EngineCommand::RequestStatus { token, job_id } => {
            let reply = api.job_status(&job_id).await;
            client_debug!("jobstatus {}: {}", job_id, reply.class());
            let _ = event_tx.send(EngineEvent::StatusReceived { token, reply });
        }
        EngineCommand::SchedulePoll { token, delay } => {
            tokio::time::sleep(delay).await;
            let _ = event_tx.send(EngineEvent::PollDue { token });
        }
        EngineCommand::FetchTranscript { job_id, mime_type } => {
            let outcome = match api.fetch_transcript(&job_id, &mime_type).await {
                Ok(bytes) => writer
                    .write(&transcript_filename(&job_id, &mime_type), &bytes)
                    .map_err(|err| {
                        client_warn!("saving transcript for {} failed: {}", job_id, err);
                        format!("Could not save the transcript: {err}")
                    }),
                Err(message) => {
                    client_warn!("transcript fetch for {} failed: {}", job_id, message);
                    Err(message)
                }
            };
            let _ = event_tx.send(EngineEvent::TranscriptStored { job_id, outcome });
        }
        EngineCommand::SendNotification {
            job_id,
            email,
            mime_type,
        } => {
            let reply = api.send_transcript(&job_id, &email, &mime_type).await;
            client_info!("sendtranscript for {}: {}", job_id, reply.class());
            let _ = event_tx.send(EngineEvent::NotifyFinished { reply });
        }
    }
}
