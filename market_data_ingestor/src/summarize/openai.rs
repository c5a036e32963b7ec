//! OpenAI chat-completions summarizer.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shared_utils::env::get_secret_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::bar::Bar,
    providers::{MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu},
    summarize::{SummaryOutcome, Summarizer, build_prompt},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    /// Creates a summarizer with the key read from `OPENAI_API_KEY`.
    pub fn from_env(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderInitError> {
        let api_key = get_secret_env_var(API_KEY_ENV).context(MissingEnvVarSnafu)?;
        Ok(Self::new(client, base_url, api_key, model))
    }

    async fn complete(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context(ReqwestSnafu)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let chat = response.json::<ChatResponse>().await.context(ReqwestSnafu)?;
        Ok(chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()))
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, symbol: &str, bars: &[Bar]) -> SummaryOutcome {
        if bars.is_empty() {
            return SummaryOutcome::Failed("no bars to summarize".to_string());
        }
        let prompt = build_prompt(symbol, bars);
        debug!(symbol, model = %self.model, bars = bars.len(), "requesting summary");

        match self.complete(&prompt).await {
            Ok(Some(text)) => SummaryOutcome::Summary(text),
            Ok(None) => SummaryOutcome::Failed("response contained no message".to_string()),
            Err(e) => SummaryOutcome::Failed(e.to_string()),
        }
    }
}
