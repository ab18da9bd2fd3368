use super::{inspect_upload, is_blank, negative_text, GenerationSettings, Prepared};
use crate::{
    bedrock::ModelInvoker,
    canvas,
    error::{BedrockError, Result},
    models::{ControlMode, GeneratedImages, RequestEnvelope, TextToImageParams},
};

pub const DEFAULT_CONTROL_STRENGTH: f32 = 0.7;

/// Text-to-image guided by the structure of a reference image.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Raw bytes of the uploaded reference image (PNG or JPEG).
    pub image: Option<Vec<u8>>,
    pub prompt: String,
    pub negative_prompt: String,
    pub control_mode: ControlMode,
    pub control_strength: f32,
    pub settings: GenerationSettings,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            image: None,
            prompt: String::new(),
            negative_prompt: String::new(),
            control_mode: ControlMode::CannyEdge,
            control_strength: DEFAULT_CONTROL_STRENGTH,
            settings: GenerationSettings::default(),
        }
    }
}

/// The reference image goes out exactly as uploaded.
pub fn prepare_request_body(inputs: &Inputs, image: &[u8]) -> Result<RequestEnvelope> {
    inputs.settings.validate()?;
    if !(0.0..=1.0).contains(&inputs.control_strength) {
        return Err(BedrockError::InvalidInput(format!(
            "control strength must be within [0, 1], got {}",
            inputs.control_strength
        )));
    }

    Ok(RequestEnvelope::TextImage {
        text_to_image_params: TextToImageParams {
            text: inputs.prompt.clone(),
            negative_text: negative_text(&inputs.negative_prompt),
            condition_image: Some(canvas::encode_base64(image)),
            control_mode: Some(inputs.control_mode),
            control_strength: Some(inputs.control_strength),
        },
        image_generation_config: inputs.settings.generation_config(),
    })
}

pub fn prepare(inputs: &Inputs) -> Result<Option<Prepared>> {
    let image = match &inputs.image {
        Some(image) if !is_blank(&inputs.prompt) => image,
        _ => {
            log::debug!("Conditioned generation skipped: image or prompt missing");
            return Ok(None);
        }
    };

    inspect_upload(image)?;
    Ok(Some(Prepared::new(prepare_request_body(inputs, image)?)))
}

pub async fn run(invoker: &dyn ModelInvoker, inputs: &Inputs) -> Result<Option<GeneratedImages>> {
    super::execute(invoker, prepare(inputs)?).await
}
