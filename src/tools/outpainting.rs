use super::{is_blank, validate_seed, Prepared, DEFAULT_SEED};
use crate::{
    bedrock::ModelInvoker,
    canvas::{self, CanvasSpec, Expansion},
    error::{BedrockError, Result},
    models::{
        GeneratedImages, ImageGenerationConfig, ImageSize, OutPaintingMode, OutPaintingParams,
        RequestEnvelope, OUTPAINTING_SIZES,
    },
};
use image::{DynamicImage, GenericImageView};
use std::str::FromStr;

/// How the model learns which part of the canvas to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskType {
    /// A text description of the content to preserve.
    Prompt,
    /// The compositor's preserve mask.
    Image,
}

impl FromStr for MaskType {
    type Err = BedrockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(MaskType::Prompt),
            "image" => Ok(MaskType::Image),
            other => Err(BedrockError::InvalidInput(format!(
                "unknown mask type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub image: Option<Vec<u8>>,
    pub prompt: String,
    pub mask_type: MaskType,
    pub mask_prompt: String,
    pub size: ImageSize,
    pub horizontal: f64,
    pub vertical: f64,
    pub seed: u32,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            image: None,
            prompt: "forest setting in the background with animals and plants".to_string(),
            mask_type: MaskType::Prompt,
            mask_prompt: String::new(),
            size: OUTPAINTING_SIZES[0],
            horizontal: 0.5,
            vertical: 0.5,
            seed: DEFAULT_SEED,
        }
    }
}

pub fn prepare_request_body(
    expansion: &Expansion,
    prompt: &str,
    mask_type: MaskType,
    mask_prompt: &str,
    seed: u32,
) -> Result<RequestEnvelope> {
    validate_seed(seed)?;

    let image = canvas::png_base64(&DynamicImage::ImageRgb8(expansion.image.clone()))?;
    let (mask_image, mask_prompt) = match mask_type {
        MaskType::Image => (
            Some(canvas::png_base64(&DynamicImage::ImageRgb8(
                expansion.mask.clone(),
            ))?),
            None,
        ),
        MaskType::Prompt => (None, Some(mask_prompt.to_string())),
    };

    Ok(RequestEnvelope::Outpainting {
        out_painting_params: OutPaintingParams {
            text: prompt.to_string(),
            image,
            out_painting_mode: OutPaintingMode::Precise,
            mask_image,
            mask_prompt,
        },
        image_generation_config: ImageGenerationConfig::single(seed),
    })
}

pub fn prepare(inputs: &Inputs) -> Result<Option<Prepared>> {
    let image = match &inputs.image {
        Some(image) if !is_blank(&inputs.prompt) => image,
        _ => {
            log::debug!("Outpainting skipped: image or prompt missing");
            return Ok(None);
        }
    };

    if !OUTPAINTING_SIZES.contains(&inputs.size) {
        return Err(BedrockError::InvalidInput(format!(
            "expanded size must be one of 512x512 or 1024x1024, got {}",
            inputs.size
        )));
    }
    let spec = CanvasSpec::new(inputs.size, inputs.horizontal, inputs.vertical)?;

    if inputs.mask_type == MaskType::Prompt && is_blank(&inputs.mask_prompt) {
        log::warn!("Mask prompt is required");
        return Ok(None);
    }

    let source = canvas::decode_image(image).map_err(|e| {
        log::error!("Error decoding uploaded image: {}", e);
        e
    })?;
    log::debug!(
        "Uploaded image of size {}x{}",
        source.dimensions().0,
        source.dimensions().1
    );

    let expansion = canvas::expand_with_spec(&source.to_rgb8(), &spec).map_err(|e| {
        log::error!("Error creating expanded image: {}", e);
        e
    })?;

    let body = prepare_request_body(
        &expansion,
        &inputs.prompt,
        inputs.mask_type,
        &inputs.mask_prompt,
        inputs.seed,
    )?;

    Ok(Some(
        Prepared::new(body)
            .with_intermediate("expanded", DynamicImage::ImageRgb8(expansion.image))
            .with_intermediate("mask", DynamicImage::ImageRgb8(expansion.mask)),
    ))
}

pub async fn run(invoker: &dyn ModelInvoker, inputs: &Inputs) -> Result<Option<GeneratedImages>> {
    super::execute(invoker, prepare(inputs)?).await
}
