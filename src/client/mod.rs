//! HTTP client for the local generation backend.

pub mod stream;
pub mod types;

use futures_util::StreamExt;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::debug;

pub use stream::ChunkStream;
pub use types::{GenerationRequest, GenerationResponse, Model};

const GENERATE_PATH: &str = "generate-local";
const STREAM_PATH: &str = "generate-local/stream";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API error {status}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),
}

#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GenerationClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// One-shot generation: returns the `output` field of the JSON reply.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, ClientError> {
        let response = self.post(GENERATE_PATH, request).await?;
        let body = response.bytes().await?;

        let parsed: GenerationResponse = serde_json::from_slice(&body)
            .map_err(|err| ClientError::MalformedResponse(err.to_string()))?;

        debug!(
            model = ?request.model,
            chars = parsed.output.len(),
            "generation completed"
        );

        Ok(parsed.output)
    }

    /// Starts a streaming generation. Fails before yielding anything if the
    /// backend answers with a non-success status.
    pub async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<ChunkStream, ClientError> {
        let response = self.post(STREAM_PATH, request).await?;
        Ok(ChunkStream::new(response))
    }

    /// Callback form of [`generate_stream`](Self::generate_stream): `on_chunk`
    /// runs once per chunk, in arrival order, before the next frame is read.
    pub async fn stream_generate<F>(
        &self,
        request: &GenerationRequest,
        mut on_chunk: F,
    ) -> Result<(), ClientError>
    where
        F: FnMut(&str),
    {
        let mut stream = self.generate_stream(request).await?;
        while let Some(chunk) = stream.next().await {
            on_chunk(&chunk?);
        }
        Ok(())
    }

    async fn post(
        &self,
        path: &str,
        request: &GenerationRequest,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.endpoint(path)?;
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|err| ClientError::InvalidEndpoint(format!("{path}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GenerationClient {
        GenerationClient::new(Url::parse(base).unwrap())
    }

    #[test]
    fn endpoints_join_onto_bare_host() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.endpoint(GENERATE_PATH).unwrap().as_str(),
            "http://localhost:8000/generate-local"
        );
        assert_eq!(
            c.endpoint(STREAM_PATH).unwrap().as_str(),
            "http://localhost:8000/generate-local/stream"
        );
    }

    #[test]
    fn endpoints_keep_base_path_prefix() {
        let c = client("http://gpu-box:9000/llm");
        assert_eq!(
            c.endpoint(GENERATE_PATH).unwrap().as_str(),
            "http://gpu-box:9000/llm/generate-local"
        );
    }

    #[test]
    fn request_serializes_flat_with_lowercase_model() {
        let req = GenerationRequest {
            prompt: "hello".into(),
            model: Model::Tinyllama,
            temperature: 0.5,
            top_p: 0.9,
            max_tokens: 200,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["prompt"], "hello");
        assert_eq!(value["model"], "tinyllama");
        assert_eq!(value["max_tokens"], 200);
        assert!(value.get("top_p").is_some());
    }
}
