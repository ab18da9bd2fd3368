use super::{is_blank, negative_text, GenerationSettings, Prepared};
use crate::{
    bedrock::ModelInvoker,
    error::Result,
    models::{GeneratedImages, RequestEnvelope, TextToImageParams},
};

#[derive(Debug, Clone)]
pub struct Inputs {
    pub prompt: String,
    pub negative_prompt: String,
    pub settings: GenerationSettings,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            prompt: "A dog in a forest".to_string(),
            negative_prompt: String::new(),
            settings: GenerationSettings::default(),
        }
    }
}

pub fn prepare_request_body(inputs: &Inputs) -> Result<RequestEnvelope> {
    inputs.settings.validate()?;

    Ok(RequestEnvelope::TextImage {
        text_to_image_params: TextToImageParams {
            text: inputs.prompt.clone(),
            negative_text: negative_text(&inputs.negative_prompt),
            condition_image: None,
            control_mode: None,
            control_strength: None,
        },
        image_generation_config: inputs.settings.generation_config().with_quality("standard"),
    })
}

pub fn prepare(inputs: &Inputs) -> Result<Option<Prepared>> {
    if is_blank(&inputs.prompt) {
        log::debug!("Text-to-image skipped: prompt is empty");
        return Ok(None);
    }

    Ok(Some(Prepared::new(prepare_request_body(inputs)?)))
}

pub async fn run(invoker: &dyn ModelInvoker, inputs: &Inputs) -> Result<Option<GeneratedImages>> {
    super::execute(invoker, prepare(inputs)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bedrock::invoker::testing::RecordingInvoker;
    use crate::models::ImageSize;
    use serde_json::json;

    fn inputs() -> Inputs {
        Inputs {
            prompt: "A lighthouse at dusk".to_string(),
            negative_prompt: "  people  ".to_string(),
            settings: GenerationSettings {
                num_images: 2,
                size: ImageSize::new(1024, 1024),
                cfg_scale: 8.0,
                seed: 42,
            },
        }
    }

    #[test]
    fn test_request_body() {
        let body = prepare_request_body(&inputs()).unwrap();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "taskType": "TEXT_IMAGE",
                "textToImageParams": {
                    "text": "A lighthouse at dusk",
                    "negativeText": "people"
                },
                "imageGenerationConfig": {
                    "numberOfImages": 2,
                    "quality": "standard",
                    "height": 1024,
                    "width": 1024,
                    "cfgScale": 8.0,
                    "seed": 42
                }
            })
        );
    }

    #[test]
    fn test_blank_negative_prompt_is_omitted() {
        let mut inputs = inputs();
        inputs.negative_prompt = "   ".to_string();
        let body = serde_json::to_value(prepare_request_body(&inputs).unwrap()).unwrap();
        assert!(body["textToImageParams"].get("negativeText").is_none());
    }

    #[tokio::test]
    async fn test_run_returns_images() {
        let invoker = RecordingInvoker::returning_images(2);
        let generated = run(&invoker, &inputs()).await.unwrap().unwrap();

        assert_eq!(generated.images.len(), 2);
        assert_eq!(invoker.last_body()["taskType"], "TEXT_IMAGE");
    }

    #[tokio::test]
    async fn test_empty_prompt_sends_nothing() {
        let invoker = RecordingInvoker::returning_images(1);
        let mut inputs = inputs();
        inputs.prompt = "  ".to_string();

        assert!(run(&invoker, &inputs).await.unwrap().is_none());
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_settings_send_nothing() {
        let invoker = RecordingInvoker::returning_images(1);
        let mut inputs = inputs();
        inputs.settings.num_images = 0;

        assert!(run(&invoker, &inputs).await.is_err());
        assert_eq!(invoker.call_count(), 0);
    }
}
