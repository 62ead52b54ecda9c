use std::path::Path;
use std::sync::{mpsc, Arc};

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;

use crate::api::HttpApi;
use crate::reply::{classify, ApiReply};
use crate::types::{AttemptId, EngineEvent, UploadAck};

/// Receives engine events as they happen.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Forwards events over an mpsc channel, dropping them once the receiving
/// side has gone away.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl HttpApi {
    /// Streams the wav from disk as the multipart `file` field, emitting
    /// byte-counter progress as the transport consumes each chunk.
    pub(crate) async fn upload_wav(
        &self,
        attempt: AttemptId,
        wav_path: &Path,
        sink: Arc<dyn ProgressSink>,
    ) -> ApiReply<UploadAck> {
        let file = match tokio::fs::File::open(wav_path).await {
            Ok(file) => file,
            Err(err) => return ApiReply::transport(err),
        };
        let total = match file.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(err) => return ApiReply::transport(err),
        };
        let file_name = wav_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let mut loaded: u64 = 0;
        let stream = ReaderStream::new(file).inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                loaded += bytes.len() as u64;
                sink.emit(EngineEvent::UploadProgress {
                    attempt,
                    loaded,
                    total,
                });
            }
        });
        let part = match Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name)
            .mime_str("audio/wav")
        {
            Ok(part) => part,
            Err(err) => return ApiReply::transport(err),
        };
        let form = Form::new().part("file", part);

        let response = match self
            .client()
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return ApiReply::transport(err),
        };
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => classify(status, &body),
            Err(err) => ApiReply::transport(err),
        }
    }
}
