use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart::Form, Client, StatusCode};
use serde::Deserialize;
use shared::{
    error::ApiError,
    protocol::{GenerateRequest, GenerateResponse, COUNT_FIELD, GENERATE_ROUTE, PROMPT_FIELD},
};
use tracing::debug;
use url::Url;

use crate::{error::GenerationError, resolver::ImageRefResolver};

const MAX_ERROR_BODY_CHARS: usize = 200;

/// External collaborator that turns a prompt into scene texts and image
/// references. Exactly one call is made per accepted submission.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GenerationError>;
}

pub struct MissingStoryGenerator;

#[async_trait]
impl StoryGenerator for MissingStoryGenerator {
    async fn generate(
        &self,
        _request: GenerateRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        Err(GenerationError::Transport(
            "no generation service configured".to_string(),
        ))
    }
}

/// `StoryGenerator` speaking to the generation service over HTTP.
pub struct HttpStoryGenerator {
    http: Client,
    service_base: Url,
}

impl HttpStoryGenerator {
    /// `service_base` should come from [`crate::resolver::service_base`].
    pub fn new(service_base: Url, request_timeout: Duration) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(GenerationError::from_reqwest)?;
        Ok(Self { http, service_base })
    }

    pub fn service_base(&self) -> &Url {
        &self.service_base
    }

    pub fn image_resolver(&self) -> Result<ImageRefResolver, url::ParseError> {
        ImageRefResolver::new(&self.service_base)
    }

    fn generate_endpoint(&self) -> Result<Url, GenerationError> {
        self.service_base
            .join(GENERATE_ROUTE)
            .map_err(|err| GenerationError::Transport(format!("invalid generate endpoint: {err}")))
    }
}

#[async_trait]
impl StoryGenerator for HttpStoryGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        let endpoint = self.generate_endpoint()?;
        let form = Form::new()
            .text(PROMPT_FIELD, request.prompt)
            .text(COUNT_FIELD, request.count.to_string());

        debug!(%endpoint, count = %request.count, "posting generation request");
        let res = self
            .http
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(GenerationError::from_reqwest)?;

        let status = res.status();
        if !status.is_success() {
            // The status alone decides the failure; a cut-off body only loses detail.
            let body = res.bytes().await.unwrap_or_default();
            return Err(GenerationError::Service {
                status: status.as_u16(),
                message: service_error_message(status, &body),
            });
        }

        let body = res.bytes().await.map_err(GenerationError::from_reqwest)?;
        serde_json::from_slice(&body)
            .map_err(|err| GenerationError::MalformedResponse(err.to_string()))
    }
}

#[derive(Deserialize)]
struct DetailBody {
    detail: serde_json::Value,
}

fn service_error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(api_error) = serde_json::from_slice::<ApiError>(body) {
        return api_error.message;
    }
    if let Ok(DetailBody { detail }) = serde_json::from_slice::<DetailBody>(body) {
        return match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
    }
    text.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
