use crate::{captions::encode_caption, domain::ImageRenderer, errors::RenderError, retry::RetryPolicy};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Url, header::USER_AGENT};
use std::time::Duration;

pub const RENDER_TIMEOUT: Duration = Duration::from_secs(15);
pub const FALLBACK_RENDER_TIMEOUT: Duration = Duration::from_secs(10);
/// Two retries (three attempts), one second apart.
pub const RENDER_RETRY: RetryPolicy = RetryPolicy::new(2, Duration::from_secs(1));

/// Wraps raw bytes in a base64 `data:` URL.
pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(bytes))
}

/// Client for the memegen.link image API.
#[derive(Debug, Clone)]
pub struct MemegenClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    render_timeout: Duration,
    fallback_timeout: Duration,
}

impl MemegenClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            retry: RENDER_RETRY,
            render_timeout: RENDER_TIMEOUT,
            fallback_timeout: FALLBACK_RENDER_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `{base}/images/{template}/{caption1}/.../{captionN}.png`
    pub fn image_url(&self, template_id: &str, captions: &[String]) -> Result<Url, RenderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| RenderError::InvalidUrl(e.to_string()))?;

        let mut segments: Vec<String> = captions.iter().map(|c| encode_caption(c)).collect();
        let template_segment = match segments.last_mut() {
            Some(last) => {
                last.push_str(".png");
                template_id.to_string()
            }
            None => format!("{}.png", template_id),
        };

        url.path_segments_mut()
            .map_err(|_| RenderError::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push("images")
            .push(&template_segment)
            .extend(segments.iter()); // Percent-encodes each caption as a path segment
        Ok(url)
    }

    async fn fetch(&self, url: Url, timeout: Duration) -> Result<String, RenderError> {
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status(status));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyBody);
        }
        Ok(data_url("image/png", &bytes))
    }
}

#[async_trait]
impl ImageRenderer for MemegenClient {
    async fn render(&self, template_id: &str, captions: &[String]) -> Result<String, RenderError> {
        let url = self.image_url(template_id, captions)?;
        tracing::debug!(%url, "Fetching meme image");
        self.retry
            .run(
                || self.fetch(url.clone(), self.render_timeout),
                |err| !matches!(err, RenderError::InvalidUrl(_)),
            )
            .await
    }

    async fn render_once(&self, template_id: &str, captions: &[String]) -> Result<String, RenderError> {
        let url = self.image_url(template_id, captions)?;
        tracing::debug!(%url, "Fetching fallback meme image");
        self.fetch(url, self.fallback_timeout).await
    }
}
