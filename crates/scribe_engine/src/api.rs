use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use thiserror::Error;
use url::Url;

use crate::reply::{classify, ApiReply};
use crate::types::{AttemptId, Format, StatusReport, UploadAck};
use crate::upload::ProgressSink;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Transcript downloads larger than this abort instead of buffering.
    pub max_transcript_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_transcript_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("server url cannot carry path segments")]
    OpaqueBaseUrl,
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// The five server operations the client relies on.
#[async_trait::async_trait]
pub trait TranscriptionApi: Send + Sync {
    async fn list_formats(&self) -> ApiReply<Vec<Format>>;
    async fn start_transcription(
        &self,
        attempt: AttemptId,
        wav_path: &Path,
        sink: Arc<dyn ProgressSink>,
    ) -> ApiReply<UploadAck>;
    async fn job_status(&self, job_id: &str) -> ApiReply<StatusReport>;
    async fn send_transcript(
        &self,
        job_id: &str,
        email: &str,
        mime_type: &str,
    ) -> ApiReply<StatusReport>;
    /// Raw transcript body; no JSON contract is assumed for this endpoint.
    async fn fetch_transcript(&self, job_id: &str, mime_type: &str) -> Result<Vec<u8>, String>;
    /// Where the icon for a format entry resolves, relative to the server.
    fn icon_url(&self, icon: &str) -> String;
}

/// Reqwest-backed implementation of the server contract. All requests carry
/// `Accept: application/json`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base: Url,
    client: reqwest::Client,
    settings: ClientSettings,
}

impl HttpApi {
    pub fn new(server_url: &str, settings: ClientSettings) -> Result<Self, ClientError> {
        let mut base = Url::parse(server_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::OpaqueBaseUrl);
        }
        // Endpoints are resolved as child segments of the base path.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base,
            client,
            settings,
        })
    }

    /// Builds an endpoint URL; each segment is percent-encoded, so opaque
    /// job ids can never alter the path structure.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .expect("base url validated in new()");
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        url
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn upload_endpoint(&self) -> Url {
        self.endpoint(&["starttranscription"])
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiReply<T> {
        let response = match self.client.get(url).send().await {
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

#[async_trait::async_trait]
impl TranscriptionApi for HttpApi {
    async fn list_formats(&self) -> ApiReply<Vec<Format>> {
        self.get_json(self.endpoint(&["listformats"])).await
    }

    async fn start_transcription(
        &self,
        attempt: AttemptId,
        wav_path: &Path,
        sink: Arc<dyn ProgressSink>,
    ) -> ApiReply<UploadAck> {
        self.upload_wav(attempt, wav_path, sink).await
    }

    async fn job_status(&self, job_id: &str) -> ApiReply<StatusReport> {
        self.get_json(self.endpoint(&["jobstatus", job_id])).await
    }

    async fn send_transcript(
        &self,
        job_id: &str,
        email: &str,
        mime_type: &str,
    ) -> ApiReply<StatusReport> {
        let mut url = self.endpoint(&["sendtranscript", job_id]);
        url.query_pairs_mut()
            .append_pair("email", email)
            .append_pair("format", mime_type);
        self.get_json(url).await
    }

    async fn fetch_transcript(&self, job_id: &str, mime_type: &str) -> Result<Vec<u8>, String> {
        let mut url = self.endpoint(&["transcript", job_id]);
        url.query_pairs_mut().append_pair("format", mime_type);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| format!("Could not retrieve the transcript: {err}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "Could not retrieve the transcript: status {}",
                status.as_u16()
            ));
        }

        let max_bytes = self.settings.max_transcript_bytes;
        if let Some(length) = response.content_length() {
            if length > max_bytes {
                return Err(format!(
                    "Transcript is too large to download ({length} bytes)"
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|err| format!("Could not retrieve the transcript: {err}"))?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err("Transcript is too large to download".to_string());
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    fn icon_url(&self, icon: &str) -> String {
        self.endpoint(&["formatter", icon]).to_string()
    }
}
