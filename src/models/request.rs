use crate::error::{BedrockError, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canvas dimensions accepted by the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

pub const TEXT_TO_IMAGE_SIZES: [ImageSize; 8] = [
    ImageSize::new(384, 576),
    ImageSize::new(384, 640),
    ImageSize::new(448, 576),
    ImageSize::new(512, 512),
    ImageSize::new(576, 384),
    ImageSize::new(768, 768),
    ImageSize::new(768, 1152),
    ImageSize::new(1024, 1024),
];

pub const OUTPAINTING_SIZES: [ImageSize; 2] =
    [ImageSize::new(512, 512), ImageSize::new(1024, 1024)];

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = BedrockError;

    /// Parses `WxH` and only accepts sizes the model supports.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BedrockError::InvalidInput(format!("unsupported image size '{}'", s));

        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let size = ImageSize::new(
            width.trim().parse().map_err(|_| invalid())?,
            height.trim().parse().map_err(|_| invalid())?,
        );

        if TEXT_TO_IMAGE_SIZES.contains(&size) {
            Ok(size)
        } else {
            Err(invalid())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMode {
    CannyEdge,
    Segmentation,
}

impl FromStr for ControlMode {
    type Err = BedrockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "CANNY_EDGE" => Ok(ControlMode::CannyEdge),
            "SEGMENTATION" => Ok(ControlMode::Segmentation),
            other => Err(BedrockError::InvalidInput(format!(
                "unknown control mode '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutPaintingMode {
    Precise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToImageParams {
    pub text: String,
    #[serde(rename = "negativeText", skip_serializing_if = "Option::is_none")]
    pub negative_text: Option<String>,
    #[serde(rename = "conditionImage", skip_serializing_if = "Option::is_none")]
    pub condition_image: Option<String>,
    #[serde(rename = "controlMode", skip_serializing_if = "Option::is_none")]
    pub control_mode: Option<ControlMode>,
    #[serde(rename = "controlStrength", skip_serializing_if = "Option::is_none")]
    pub control_strength: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InPaintingParams {
    pub text: String,
    pub image: String,
    #[serde(rename = "maskImage")]
    pub mask_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutPaintingParams {
    pub text: String,
    pub image: String,
    #[serde(rename = "outPaintingMode")]
    pub out_painting_mode: OutPaintingMode,
    #[serde(rename = "maskImage", skip_serializing_if = "Option::is_none")]
    pub mask_image: Option<String>,
    #[serde(rename = "maskPrompt", skip_serializing_if = "Option::is_none")]
    pub mask_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundRemovalParams {
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationConfig {
    #[serde(rename = "numberOfImages")]
    pub number_of_images: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(rename = "cfgScale", skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

impl ImageGenerationConfig {
    /// One image, no size or guidance settings, as the editing tasks send.
    pub fn single(seed: u32) -> Self {
        Self {
            number_of_images: 1,
            quality: None,
            height: None,
            width: None,
            cfg_scale: None,
            seed: Some(seed),
        }
    }

    pub fn sized(number_of_images: u32, size: ImageSize, cfg_scale: f32, seed: u32) -> Self {
        Self {
            number_of_images,
            quality: None,
            height: Some(size.height),
            width: Some(size.width),
            cfg_scale: Some(cfg_scale),
            seed: Some(seed),
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }
}

/// JSON body sent to the model, tagged by `taskType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "taskType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestEnvelope {
    TextImage {
        #[serde(rename = "textToImageParams")]
        text_to_image_params: TextToImageParams,
        #[serde(rename = "imageGenerationConfig")]
        image_generation_config: ImageGenerationConfig,
    },
    Inpainting {
        #[serde(rename = "inPaintingParams")]
        in_painting_params: InPaintingParams,
        #[serde(rename = "imageGenerationConfig")]
        image_generation_config: ImageGenerationConfig,
    },
    Outpainting {
        #[serde(rename = "outPaintingParams")]
        out_painting_params: OutPaintingParams,
        #[serde(rename = "imageGenerationConfig")]
        image_generation_config: ImageGenerationConfig,
    },
    BackgroundRemoval {
        #[serde(rename = "backgroundRemovalParams")]
        background_removal_params: BackgroundRemovalParams,
    },
}

impl RequestEnvelope {
    pub fn task_type(&self) -> &'static str {
        match self {
            RequestEnvelope::TextImage { .. } => "TEXT_IMAGE",
            RequestEnvelope::Inpainting { .. } => "INPAINTING",
            RequestEnvelope::Outpainting { .. } => "OUTPAINTING",
            RequestEnvelope::BackgroundRemoval { .. } => "BACKGROUND_REMOVAL",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Body returned by the model: base64 PNGs, or an error message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedImages {
    pub request_id: String,
    pub task_type: &'static str,
    pub images: Vec<DynamicImage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_image_size() {
        assert_eq!("512x512".parse::<ImageSize>().unwrap(), ImageSize::new(512, 512));
        assert_eq!("768X1152".parse::<ImageSize>().unwrap(), ImageSize::new(768, 1152));
        assert_eq!(ImageSize::new(384, 640).to_string(), "384x640");
    }

    #[test]
    fn test_reject_unsupported_size() {
        assert!("500x500".parse::<ImageSize>().is_err());
        assert!("512".parse::<ImageSize>().is_err());
        assert!("axb".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_outpainting_sizes_are_supported() {
        for size in OUTPAINTING_SIZES {
            assert!(TEXT_TO_IMAGE_SIZES.contains(&size));
        }
    }

    #[test]
    fn test_parse_control_mode() {
        assert_eq!("canny-edge".parse::<ControlMode>().unwrap(), ControlMode::CannyEdge);
        assert_eq!(
            "SEGMENTATION".parse::<ControlMode>().unwrap(),
            ControlMode::Segmentation
        );
        assert!("depth".parse::<ControlMode>().is_err());
    }

    #[test]
    fn test_background_removal_shape() {
        let body = RequestEnvelope::BackgroundRemoval {
            background_removal_params: BackgroundRemovalParams {
                image: "aGk=".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "taskType": "BACKGROUND_REMOVAL",
                "backgroundRemovalParams": { "image": "aGk=" }
            })
        );
        assert_eq!(body.task_type(), "BACKGROUND_REMOVAL");
    }

    #[test]
    fn test_text_image_omits_absent_fields() {
        let body = RequestEnvelope::TextImage {
            text_to_image_params: TextToImageParams {
                text: "A dog in a forest".to_string(),
                negative_text: None,
                condition_image: None,
                control_mode: None,
                control_strength: None,
            },
            image_generation_config: ImageGenerationConfig::sized(
                2,
                ImageSize::new(768, 768),
                7.5,
                12,
            )
            .with_quality("standard"),
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "taskType": "TEXT_IMAGE",
                "textToImageParams": { "text": "A dog in a forest" },
                "imageGenerationConfig": {
                    "numberOfImages": 2,
                    "quality": "standard",
                    "height": 768,
                    "width": 768,
                    "cfgScale": 7.5,
                    "seed": 12
                }
            })
        );
    }

    #[test]
    fn test_response_defaults() {
        let response: InvocationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.images.is_empty());
        assert!(response.error.is_none());

        let response: InvocationResponse =
            serde_json::from_str(r#"{"images":["a","b"],"error":null}"#).unwrap();
        assert_eq!(response.images, vec!["a", "b"]);
    }
}
