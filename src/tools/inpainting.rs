use super::{is_blank, validate_seed, Prepared, DEFAULT_SEED};
use crate::{
    bedrock::ModelInvoker,
    canvas::{self, MAX_IMAGE_SIZE},
    error::{BedrockError, Result},
    models::{GeneratedImages, ImageGenerationConfig, InPaintingParams, RequestEnvelope},
};
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, RgbImage, RgbaImage};

/// Repaints the regions a user drew over, guided by a prompt.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub image: Option<Vec<u8>>,
    /// RGBA layer of the user's strokes; alpha marks coverage.
    pub stroke_layer: Option<Vec<u8>>,
    pub prompt: String,
    pub seed: u32,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            image: None,
            stroke_layer: None,
            prompt: "Replace the masked area with a honey bee".to_string(),
            seed: DEFAULT_SEED,
        }
    }
}

pub fn prepare_request_body(
    image: &DynamicImage,
    mask: &RgbImage,
    prompt: &str,
    seed: u32,
) -> Result<RequestEnvelope> {
    validate_seed(seed)?;

    Ok(RequestEnvelope::Inpainting {
        in_painting_params: InPaintingParams {
            text: prompt.to_string(),
            image: canvas::png_base64(image)?,
            mask_image: canvas::png_base64(&DynamicImage::ImageRgb8(mask.clone()))?,
        },
        image_generation_config: ImageGenerationConfig::single(seed),
    })
}

/// Brings the stroke layer to the working size. A layer drawn over the
/// original upload follows the same downscale as the image.
fn fit_stroke_layer(
    layer: RgbaImage,
    original: (u32, u32),
    working: (u32, u32),
) -> Result<RgbaImage> {
    let size = layer.dimensions();
    if size == working {
        return Ok(layer);
    }
    if size == original {
        return Ok(imageops::resize(&layer, working.0, working.1, FilterType::Lanczos3));
    }

    Err(BedrockError::InvalidInput(format!(
        "mask is {}x{} but the image is {}x{}",
        size.0, size.1, working.0, working.1
    )))
}

pub fn prepare(inputs: &Inputs) -> Result<Option<Prepared>> {
    let (image, strokes) = match (&inputs.image, &inputs.stroke_layer) {
        (Some(image), Some(strokes)) if !is_blank(&inputs.prompt) => (image, strokes),
        _ => {
            log::debug!("Inpainting skipped: image, mask or prompt missing");
            return Ok(None);
        }
    };

    let source = canvas::decode_image(image).map_err(|e| {
        log::error!("Error decoding uploaded image: {}", e);
        e
    })?;
    let original = source.dimensions();
    log::info!("Uploaded image of size {}x{}", original.0, original.1);

    let working = canvas::resize_to_bound(&source, MAX_IMAGE_SIZE);

    let layer = canvas::decode_image(strokes)
        .map_err(|e| {
            log::error!("Error processing mask image: {}", e);
            e
        })?
        .to_rgba8();
    let layer = fit_stroke_layer(layer, original, working.dimensions())?;
    let mask = canvas::binarize_drawn_mask(&layer);

    let body = prepare_request_body(&working, &mask, &inputs.prompt, inputs.seed)?;
    Ok(Some(
        Prepared::new(body)
            .with_intermediate("mask", DynamicImage::ImageRgb8(mask))
            .with_intermediate("image", working),
    ))
}

pub async fn run(invoker: &dyn ModelInvoker, inputs: &Inputs) -> Result<Option<GeneratedImages>> {
    super::execute(invoker, prepare(inputs)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bedrock::invoker::testing::RecordingInvoker;
    use crate::canvas::{MASK_BLACK, MASK_WHITE};
    use image::{Rgb, Rgba};

    fn png(image: DynamicImage) -> Vec<u8> {
        canvas::encode_png(&image).unwrap()
    }

    /// Stroke layer with the left half drawn in black.
    fn half_drawn(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    fn inputs(width: u32, height: u32) -> Inputs {
        Inputs {
            image: Some(png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                width,
                height,
                Rgb([100, 150, 200]),
            )))),
            stroke_layer: Some(png(DynamicImage::ImageRgba8(half_drawn(width, height)))),
            prompt: "a red balloon".to_string(),
            seed: 99,
        }
    }

    fn mask_of(prepared: &Prepared) -> RgbImage {
        prepared
            .intermediates
            .iter()
            .find(|(label, _)| *label == "mask")
            .map(|(_, image)| image.to_rgb8())
            .unwrap()
    }

    #[test]
    fn test_prepare_builds_binary_mask() {
        let prepared = prepare(&inputs(64, 32)).unwrap().unwrap();
        let mask = mask_of(&prepared);

        assert_eq!(mask.dimensions(), (64, 32));
        assert_eq!(*mask.get_pixel(0, 0), MASK_BLACK);
        assert_eq!(*mask.get_pixel(63, 31), MASK_WHITE);
        assert!(mask.pixels().all(|px| *px == MASK_BLACK || *px == MASK_WHITE));
    }

    #[test]
    fn test_request_body_shape() {
        let prepared = prepare(&inputs(16, 16)).unwrap().unwrap();
        let body = serde_json::to_value(&prepared.body).unwrap();

        assert_eq!(body["taskType"], "INPAINTING");
        assert_eq!(body["inPaintingParams"]["text"], "a red balloon");
        assert_eq!(body["imageGenerationConfig"]["numberOfImages"], 1);
        assert_eq!(body["imageGenerationConfig"]["seed"], 99);
        assert!(body["imageGenerationConfig"].get("cfgScale").is_none());

        let mask = canvas::decode_base64_image(
            body["inPaintingParams"]["maskImage"].as_str().unwrap(),
        )
        .unwrap();
        assert_eq!(mask.to_rgb8(), mask_of(&prepared));
    }

    #[test]
    fn test_large_upload_is_resized_with_its_mask() {
        let prepared = prepare(&inputs(2048, 512)).unwrap().unwrap();
        let mask = mask_of(&prepared);

        assert_eq!(mask.dimensions(), (1024, 256));
        assert_eq!(*mask.get_pixel(10, 10), MASK_BLACK);
        assert_eq!(*mask.get_pixel(1000, 10), MASK_WHITE);
    }

    #[test]
    fn test_mismatched_mask_is_rejected() {
        let mut inputs = inputs(64, 64);
        inputs.stroke_layer = Some(png(DynamicImage::ImageRgba8(half_drawn(10, 10))));

        assert!(matches!(
            prepare(&inputs),
            Err(BedrockError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_inputs_send_nothing() {
        let invoker = RecordingInvoker::returning_images(1);

        let mut no_mask = inputs(8, 8);
        no_mask.stroke_layer = None;
        assert!(run(&invoker, &no_mask).await.unwrap().is_none());

        let mut no_prompt = inputs(8, 8);
        no_prompt.prompt = " ".to_string();
        assert!(run(&invoker, &no_prompt).await.unwrap().is_none());

        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run() {
        let invoker = RecordingInvoker::returning_images(1);
        let generated = run(&invoker, &inputs(32, 32)).await.unwrap().unwrap();

        assert_eq!(generated.task_type, "INPAINTING");
        assert_eq!(generated.images.len(), 1);
        assert_eq!(invoker.call_count(), 1);
    }
}
