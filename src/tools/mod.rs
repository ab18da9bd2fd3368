//! One module per tool. Each turns its inputs into a [`Prepared`] request
//! (or `None` when a required input is missing) and submits it through a
//! [`ModelInvoker`].

pub mod background;
pub mod condition;
pub mod inpainting;
pub mod outpainting;
pub mod text_to_image;

use crate::{
    bedrock::{decode_images, ModelInvoker},
    canvas,
    error::{BedrockError, Result},
    models::{GeneratedImages, ImageGenerationConfig, ImageSize, RequestEnvelope},
};
use image::{DynamicImage, GenericImageView};
use std::time::Instant;
use uuid::Uuid;

pub const MAX_IMAGES: u32 = 5;
pub const MAX_SEED: u32 = 858_993_459;
pub const DEFAULT_SEED: u32 = 12;
pub const DEFAULT_CFG_SCALE: f32 = 7.5;
pub const CFG_SCALE_RANGE: (f32, f32) = (1.0, 10.0);
/// Side lengths the model accepts for uploaded reference images.
pub const INPUT_SIDE_RANGE: (u32, u32) = (320, 4096);

/// A request body ready to send, plus any local images built on the way.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub body: RequestEnvelope,
    pub intermediates: Vec<(&'static str, DynamicImage)>,
}

impl Prepared {
    pub fn new(body: RequestEnvelope) -> Self {
        Self {
            body,
            intermediates: Vec::new(),
        }
    }

    pub fn with_intermediate(mut self, label: &'static str, image: DynamicImage) -> Self {
        self.intermediates.push((label, image));
        self
    }
}

/// Shared knobs of the two text-to-image tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub num_images: u32,
    pub size: ImageSize,
    pub cfg_scale: f32,
    pub seed: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            num_images: 1,
            size: ImageSize::new(384, 576),
            cfg_scale: DEFAULT_CFG_SCALE,
            seed: DEFAULT_SEED,
        }
    }
}

impl GenerationSettings {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_IMAGES).contains(&self.num_images) {
            return Err(BedrockError::InvalidInput(format!(
                "number of images must be between 1 and {}",
                MAX_IMAGES
            )));
        }
        if !(CFG_SCALE_RANGE.0..=CFG_SCALE_RANGE.1).contains(&self.cfg_scale) {
            return Err(BedrockError::InvalidInput(format!(
                "cfgScale must be between {} and {}",
                CFG_SCALE_RANGE.0, CFG_SCALE_RANGE.1
            )));
        }
        validate_seed(self.seed)
    }

    pub fn generation_config(&self) -> ImageGenerationConfig {
        ImageGenerationConfig::sized(self.num_images, self.size, self.cfg_scale, self.seed)
    }
}

pub fn validate_seed(seed: u32) -> Result<()> {
    if !(1..=MAX_SEED).contains(&seed) {
        return Err(BedrockError::InvalidInput(format!(
            "seed must be between 1 and {}",
            MAX_SEED
        )));
    }
    Ok(())
}

/// Trimmed negative prompt, or `None` when it is blank.
pub fn negative_text(negative_prompt: &str) -> Option<String> {
    let trimmed = negative_prompt.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Decodes an upload and warns when a side is outside what the model takes.
pub(crate) fn inspect_upload(bytes: &[u8]) -> Result<DynamicImage> {
    let image = canvas::decode_image(bytes).map_err(|e| {
        log::error!("Error decoding uploaded image: {}", e);
        e
    })?;

    let (width, height) = image.dimensions();
    let (min, max) = INPUT_SIDE_RANGE;
    if !(min..=max).contains(&width) || !(min..=max).contains(&height) {
        log::warn!(
            "Uploaded image is {}x{}; each side should be between {} and {} pixels",
            width,
            height,
            min,
            max
        );
    }

    Ok(image)
}

/// Sends a prepared body and decodes whatever comes back.
pub async fn submit(invoker: &dyn ModelInvoker, body: &RequestEnvelope) -> Result<GeneratedImages> {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();
    log::info!(
        request_id = request_id.as_str();
        "Submitting {} request to {}",
        body.task_type(),
        invoker.model_id()
    );

    let response = invoker.invoke(body).await.map_err(|e| {
        log::error!(request_id = request_id.as_str(); "Request failed: {}", e);
        e
    })?;

    let images = decode_images(&response).map_err(|e| {
        log::error!(request_id = request_id.as_str(); "Error decoding generated images: {}", e);
        e
    })?;

    let duration_ms = started.elapsed().as_millis() as u64;
    log::info!(
        request_id = request_id.as_str(), duration_ms = duration_ms;
        "Request returned {} image(s)",
        images.len()
    );

    Ok(GeneratedImages {
        request_id,
        task_type: body.task_type(),
        images,
    })
}

/// Submits `prepared` if there is anything to submit.
pub async fn execute(
    invoker: &dyn ModelInvoker,
    prepared: Option<Prepared>,
) -> Result<Option<GeneratedImages>> {
    match prepared {
        Some(prepared) => submit(invoker, &prepared.body).await.map(Some),
        None => Ok(None),
    }
}
