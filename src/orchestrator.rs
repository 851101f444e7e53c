use crate::{
    captions::sanitize_captions,
    domain::{CaptionSource, ImageRenderer},
    errors::{AttemptError, GenerationError},
    fallback::FallbackGenerator,
    models::{BATCH_SIZE, MemeKind, MemeResult, Template},
    templates::MEMEGEN_TEMPLATES,
};
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Template attempts allowed per request before giving up on the primary pipeline.
pub const MAX_ATTEMPTS: usize = 10;

/// Drives caption generation and rendering across shuffled templates until a
/// full batch is collected.
#[derive(Clone)]
pub struct MemeOrchestrator {
    captions: Arc<dyn CaptionSource>,
    renderer: Arc<dyn ImageRenderer>,
    fallback: FallbackGenerator,
    templates: Vec<Template>,
}

impl MemeOrchestrator {
    pub fn new(captions: Arc<dyn CaptionSource>, renderer: Arc<dyn ImageRenderer>) -> Self {
        Self {
            fallback: FallbackGenerator::new(renderer.clone()),
            captions,
            renderer,
            templates: MEMEGEN_TEMPLATES.to_vec(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_templates(mut self, templates: Vec<Template>) -> Self {
        self.templates = templates;
        self
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Returns exactly `BATCH_SIZE` memes, or an error if no template attempt
    /// succeeded. Partial success is topped up from the fallback tier.
    pub async fn generate(&self, topic: &str) -> Result<Vec<MemeResult>, GenerationError> {
        let mut templates = self.templates.clone();
        templates.shuffle(&mut rand::thread_rng());

        let mut memes: Vec<MemeResult> = Vec::with_capacity(BATCH_SIZE);
        let mut attempts = 0;

        while memes.len() < BATCH_SIZE && attempts < MAX_ATTEMPTS && !templates.is_empty() {
            let template = templates[attempts % templates.len()];
            let index = memes.len() + 1;
            tracing::debug!(%topic, template = template.name, index, attempt = attempts + 1, "Attempting template");

            match self.run_primary(topic, template, index).await {
                Ok(meme) => {
                    memes.push(meme);
                    tracing::info!(%topic, template = template.name, "Meme {}/{} generated", memes.len(), BATCH_SIZE);
                }
                Err(e) => {
                    tracing::warn!(%topic, template = template.name, index, error = %e, "Template attempt failed, trying next");
                }
            }
            attempts += 1;
        }

        tracing::info!(%topic, generated = memes.len(), attempts, "Primary generation finished");

        if memes.is_empty() {
            return Err(GenerationError::NoMemesGenerated { attempts });
        }

        while memes.len() < BATCH_SIZE {
            let meme = self.fallback.generate(topic, memes.len() + 1).await;
            memes.push(meme);
        }

        memes.truncate(BATCH_SIZE);
        Ok(memes)
    }

    /// One template attempt: captions from the model, then the rendered image.
    async fn run_primary(&self, topic: &str, template: Template, index: usize) -> Result<MemeResult, AttemptError> {
        let raw = self.captions.generate(topic, template.boxes).await?;
        let captions = sanitize_captions(&raw, template.boxes, topic);
        tracing::debug!(index, captions = %captions.join(" | "), "Captions ready");

        let image = self.renderer.render(template.id, &captions).await?;

        Ok(MemeResult {
            success: true,
            caption: captions.join(" / "),
            image_base64: image,
            topic: topic.to_string(),
            template: template.name.to_string(),
            kind: MemeKind::Primary,
            index,
        })
    }
}
