use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use scribe_core::{init, update, AppState, AppViewModel, Effect, JobStatus, Msg};
use scribe_engine::{ClientSettings, EngineConfig, EngineEvent, EngineHandle};
use scribe_logging::{client_info, client_warn};

use super::effects::{msg_for_event, EffectRunner};
use super::logging::{self, LogDestination};
use super::render;

/// Terminal transcription client: uploads a wav file, follows the job to
/// completion and saves the transcript, or hands completion off to email.
#[derive(Debug, Parser)]
#[command(name = "scribe", version, about)]
pub struct Args {
    /// Base URL of the transcription server.
    #[arg(long)]
    pub server: String,
    /// The .wav file to transcribe.
    pub wav: PathBuf,
    /// MIME type of the transcript format to request.
    #[arg(long)]
    pub format: Option<String>,
    /// Ask the server to email the transcript instead of waiting for it.
    #[arg(long)]
    pub email: Option<String>,
    /// Directory transcripts are saved into.
    #[arg(long, default_value = "output")]
    pub output: PathBuf,
    /// Also write logs to ./scribe.log.
    #[arg(long)]
    pub log_file: bool,
}

pub fn run(args: Args) -> Result<()> {
    logging::initialize(if args.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    });

    let engine = EngineHandle::new(EngineConfig {
        server_url: args.server.clone(),
        output_dir: args.output.clone(),
        settings: ClientSettings::default(),
    })
    .context("could not set up the transcription client")?;
    let runner = EffectRunner::new(engine, args.wav.clone());
    let mut autopilot = Autopilot::new(&args);

    let (mut state, effects) = init();
    runner.run_all(effects);

    let mut transcript_saved = false;
    let mut transcript_failed = false;

    loop {
        let mut progressed = false;

        while let Some(event) = runner.try_recv_event() {
            progressed = true;
            match &event {
                EngineEvent::TranscriptStored { outcome: Ok(_), .. } => transcript_saved = true,
                EngineEvent::TranscriptStored {
                    outcome: Err(_), ..
                } => transcript_failed = true,
                _ => {}
            }
            state = dispatch(state, msg_for_event(event), &runner)?;
        }

        for msg in autopilot.next_inputs(&state.view()) {
            progressed = true;
            state = dispatch(state, msg, &runner)?;
        }

        if state.consume_dirty() {
            render::print_view(&state.view());
        }

        match state.view().lifecycle {
            Some(JobStatus::Failed) => bail!("transcription failed"),
            Some(JobStatus::NotifyRequested) => {
                client_info!("hand-off complete; the server will email the transcript");
                return Ok(());
            }
            Some(JobStatus::Complete) if transcript_saved => return Ok(()),
            Some(JobStatus::Complete) if transcript_failed => {
                bail!("transcript retrieval failed")
            }
            _ => {}
        }

        if !progressed {
            thread::sleep(Duration::from_millis(20));
        }
    }
}

/// Applies one message and executes the resulting effects. A validation
/// alert aborts the run: in a scripted session there is nobody left to
/// correct the input.
fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> Result<AppState> {
    let (state, effects) = update(state, msg);
    for effect in effects {
        if let Effect::Alert { message } = &effect {
            bail!("{message}");
        }
        runner.run(effect);
    }
    Ok(state)
}

/// Plays the user: selects the requested format once the catalog is in,
/// submits the wav, and asks for email delivery when the server offers it.
struct Autopilot {
    wav_name: String,
    format: Option<String>,
    email: Option<String>,
    format_selected: bool,
    file_submitted: bool,
    email_requested: bool,
}

impl Autopilot {
    fn new(args: &Args) -> Self {
        let wav_name = args
            .wav
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            wav_name,
            format: args.format.clone(),
            email: args.email.clone(),
            format_selected: false,
            file_submitted: false,
            email_requested: false,
        }
    }

    fn next_inputs(&mut self, view: &AppViewModel) -> Vec<Msg> {
        let mut msgs = Vec::new();

        if !self.format_selected && !view.formats.is_empty() {
            self.format_selected = true;
            if let Some(wanted) = &self.format {
                match view
                    .formats
                    .iter()
                    .position(|format| format.mime_type == *wanted)
                {
                    Some(index) => msgs.push(Msg::FormatSelected { index }),
                    None => client_warn!(
                        "server does not offer format {}; using the default selection",
                        wanted
                    ),
                }
            }
        }

        // Submit once the catalog has answered either way; a failed catalog
        // load still leaves the default format usable.
        if !self.file_submitted && (!view.formats.is_empty() || view.formats_error.is_some()) {
            self.file_submitted = true;
            msgs.push(Msg::FileChosen {
                file_name: self.wav_name.clone(),
            });
        }

        if !self.email_requested && view.notification_visible {
            if let Some(email) = &self.email {
                self.email_requested = true;
                msgs.push(Msg::NotifyClicked {
                    email: email.clone(),
                });
            }
        }

        msgs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::FormatView;

    fn args() -> Args {
        Args {
            server: "http://localhost:8080/".to_string(),
            wav: PathBuf::from("interview.wav"),
            format: Some("text/plain".to_string()),
            email: None,
            output: PathBuf::from("output"),
            log_file: false,
        }
    }

    fn catalog_view() -> AppViewModel {
        AppViewModel {
            formats: vec![
                FormatView {
                    mime_type: "application/json".to_string(),
                    name: "JSON".to_string(),
                    icon: "json.png".to_string(),
                    selected: true,
                },
                FormatView {
                    mime_type: "text/plain".to_string(),
                    name: "Plain text".to_string(),
                    icon: "text.png".to_string(),
                    selected: false,
                },
            ],
            ..AppViewModel::default()
        }
    }

    #[test]
    fn selects_the_requested_format_before_submitting() {
        let mut autopilot = Autopilot::new(&args());
        let msgs = autopilot.next_inputs(&catalog_view());

        assert_eq!(
            msgs,
            vec![
                Msg::FormatSelected { index: 1 },
                Msg::FileChosen {
                    file_name: "interview.wav".to_string(),
                },
            ]
        );

        // Inputs are one-shot.
        assert!(autopilot.next_inputs(&catalog_view()).is_empty());
    }

    #[test]
    fn submits_even_when_the_catalog_failed() {
        let mut autopilot = Autopilot::new(&args());
        let view = AppViewModel {
            formats_error: Some("boom".to_string()),
            ..AppViewModel::default()
        };
        let msgs = autopilot.next_inputs(&view);
        assert_eq!(
            msgs,
            vec![Msg::FileChosen {
                file_name: "interview.wav".to_string(),
            }]
        );
    }

    #[test]
    fn requests_email_delivery_when_offered() {
        let mut autopilot = Autopilot::new(&Args {
            email: Some("someone@example.com".to_string()),
            ..args()
        });
        let _ = autopilot.next_inputs(&catalog_view());

        let view = AppViewModel {
            notification_visible: true,
            ..catalog_view()
        };
        let msgs = autopilot.next_inputs(&view);
        assert_eq!(
            msgs,
            vec![Msg::NotifyClicked {
                email: "someone@example.com".to_string(),
            }]
        );
        assert!(autopilot.next_inputs(&view).is_empty());
    }
}
