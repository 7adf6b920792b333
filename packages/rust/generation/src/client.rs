//! Generation collaborator: trait plus an OpenAI-compatible HTTP client.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use contentfactory_shared::{ContentFactoryError, GenerationSettings, Result};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("ContentFactory/", env!("CARGO_PKG_VERSION"));

/// Chat completions endpoint, relative to the API base URL.
const COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Anything that turns a prompt into a single text completion.
pub trait TextGenerator: Send + Sync {
    fn complete(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

/// Client for an OpenAI-compatible chat completions API.
pub struct OpenAiClient {
    client: Client,
    endpoint: Url,
}

impl OpenAiClient {
    /// Build a client that authenticates with `api_key` against `base_url`.
    pub fn new(api_key: &str, base_url: &Url, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| ContentFactoryError::config("API key contains invalid header characters"))?;
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ContentFactoryError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        let endpoint = completions_endpoint(base_url)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve the completions endpoint under `base_url`.
///
/// The base may be the bare host, a path prefix, or already end in `/v1`
/// (`https://api.openai.com/v1/`); all resolve to one `v1/chat/completions`.
fn completions_endpoint(base_url: &Url) -> Result<Url> {
    let mut base = base_url.clone();
    let trimmed = base.path().trim_end_matches('/');
    let prefix = trimmed.strip_suffix("/v1").unwrap_or(trimmed);
    base.set_path(&format!("{prefix}/"));
    base.join(COMPLETIONS_PATH).map_err(|e| {
        ContentFactoryError::config(format!("invalid base URL '{base_url}': {e}"))
    })
}

impl TextGenerator for OpenAiClient {
    #[instrument(skip_all, fields(model = %settings.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, settings: &GenerationSettings) -> Result<String> {
        let body = ChatRequest {
            model: settings.model.as_str(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            presence_penalty: settings.presence_penalty,
            frequency_penalty: settings.frequency_penalty,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ContentFactoryError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            let snippet: String = text.chars().take(500).collect();
            return Err(ContentFactoryError::Generation(format!(
                "service returned HTTP {status}: {snippet}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ContentFactoryError::Generation(format!("failed to parse completion response: {e}"))
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                "completion received"
            );
        }

        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ContentFactoryError::Generation("response contained no completion".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
