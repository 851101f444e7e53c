use crate::{domain::CaptionSource, errors::CaptionError};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CAPTION_MODEL: &str = "llama-3.3-70b-versatile";
pub const CAPTION_TEMPERATURE: f64 = 1.2;
pub const CAPTION_MAX_TOKENS: u32 = 150;
pub const CAPTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

/// Builds the single user message sent for each template attempt.
pub fn caption_prompt(topic: &str, count: usize) -> String {
    format!(
        "Generate {count} SHORT funny meme captions about: \"{topic}\".\n\
         \n\
         Context: Indian audience, be factual and balanced.\n\
         Rules:\n\
         - Each caption under 50 characters\n\
         - Make it relatable and funny\n\
         - Return ONLY the captions, one per line\n\
         - No quotes, no numbering\n\
         \n\
         Topic: {topic}"
    )
}

/// Groq chat-completions client (OpenAI-compatible API).
#[derive(Debug, Clone)]
pub struct GroqCaptionClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GroqCaptionClient {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            timeout: CAPTION_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn complete(&self, api_key: &str, prompt: String) -> Result<String, CaptionError> {
        let body = ChatCompletionRequest {
            model: CAPTION_MODEL,
            messages: vec![ChatMessage { role: "user".to_string(), content: Some(prompt) }],
            temperature: CAPTION_TEMPERATURE,
            max_tokens: CAPTION_MAX_TOKENS,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaptionError::Upstream { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        // A reply without content is treated as empty text; the sanitizer pads it with the topic.
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CaptionSource for GroqCaptionClient {
    async fn generate(&self, topic: &str, count: usize) -> Result<String, CaptionError> {
        let api_key = self.api_key.as_deref().ok_or(CaptionError::MissingApiKey)?;
        tracing::debug!(%topic, count, model = CAPTION_MODEL, "Requesting captions");

        tokio::time::timeout(self.timeout, self.complete(api_key, caption_prompt(topic, count)))
            .await
            .map_err(|_| CaptionError::Timeout(self.timeout))?
    }
}
