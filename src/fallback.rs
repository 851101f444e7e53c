use crate::{
    domain::ImageRenderer,
    models::{MemeKind, MemeResult},
    renderer::data_url,
    templates::FALLBACK_TEMPLATE,
};
use std::sync::Arc;

/// Second caption used with the fallback template ("<topic> / Everywhere").
pub const FALLBACK_SECOND_LINE: &str = "Everywhere";

/// Produces a degraded meme when the primary pipeline came up short.
#[derive(Clone)]
pub struct FallbackGenerator {
    renderer: Arc<dyn ImageRenderer>,
}

impl FallbackGenerator {
    pub fn new(renderer: Arc<dyn ImageRenderer>) -> Self {
        Self { renderer }
    }

    /// Tries the simple template once; if that fetch fails, draws a placeholder locally.
    /// Never fails.
    pub async fn generate(&self, topic: &str, index: usize) -> MemeResult {
        tracing::info!(%topic, index, "Generating fallback meme");
        let captions = vec![topic.to_string(), FALLBACK_SECOND_LINE.to_string()];

        match self.renderer.render_once(FALLBACK_TEMPLATE.id, &captions).await {
            Ok(image) => MemeResult {
                success: true,
                caption: captions.join(" / "),
                image_base64: image,
                topic: topic.to_string(),
                template: FALLBACK_TEMPLATE.name.to_string(),
                kind: MemeKind::Fallback,
                index,
            },
            Err(e) => {
                tracing::warn!(%topic, index, error = %e, "Fallback render failed, using placeholder");
                placeholder_meme(topic, index)
            }
        }
    }
}

/// Locally drawn meme: the topic in bold on a flat background.
pub fn placeholder_meme(topic: &str, index: usize) -> MemeResult {
    MemeResult {
        success: true,
        caption: topic.to_string(),
        image_base64: data_url("image/svg+xml", placeholder_svg(topic).as_bytes()),
        topic: topic.to_string(),
        template: "Simple".to_string(),
        kind: MemeKind::Placeholder,
        index,
    }
}

fn placeholder_svg(topic: &str) -> String {
    format!(
        r##"<svg width="800" height="600" xmlns="http://www.w3.org/2000/svg">
  <rect width="800" height="600" fill="#667eea"/>
  <text x="400" y="300" font-family="Impact" font-size="48" font-weight="bold" text-anchor="middle" dominant-baseline="middle" fill="white" stroke="black" stroke-width="3">{}</text>
</svg>"##,
        escape_xml(&topic.to_uppercase())
    )
}

// The topic is user input and lands inside SVG markup.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
