use crate::{
    canvas,
    error::{BedrockError, Result},
    models::{InvocationResponse, RequestEnvelope},
};
use async_trait::async_trait;
use image::DynamicImage;

/// Anything that can run a request body against an image model.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, body: &RequestEnvelope) -> Result<InvocationResponse>;

    fn model_id(&self) -> &str;
}

/// Parses a raw model response, turning an `error` payload into an error.
pub fn parse_response(bytes: &[u8]) -> Result<InvocationResponse> {
    let response: InvocationResponse = serde_json::from_slice(bytes)
        .map_err(|e| BedrockError::ResponseError(format!("malformed response: {}", e)))?;

    match response.error.as_deref().map(str::trim) {
        Some(error) if !error.is_empty() => Err(BedrockError::ResponseError(error.to_string())),
        _ => Ok(response),
    }
}

pub fn decode_images(response: &InvocationResponse) -> Result<Vec<DynamicImage>> {
    if response.images.is_empty() {
        return Err(BedrockError::ResponseError(
            "No images returned from the model".into(),
        ));
    }

    response
        .images
        .iter()
        .map(|data| canvas::decode_base64_image(data))
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::canvas::png_base64;
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;

    /// Records every body it receives and answers with a fixed response.
    pub struct RecordingInvoker {
        pub calls: Mutex<Vec<RequestEnvelope>>,
        response: std::result::Result<InvocationResponse, String>,
    }

    impl RecordingInvoker {
        pub fn returning_images(count: usize) -> Self {
            let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])));
            let encoded = png_base64(&image).unwrap();
            Self {
                calls: Mutex::new(Vec::new()),
                response: Ok(InvocationResponse {
                    images: vec![encoded; count],
                    error: None,
                }),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                response: Err(message.to_string()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_body(&self) -> serde_json::Value {
            let calls = self.calls.lock().unwrap();
            serde_json::to_value(calls.last().expect("no invocation recorded")).unwrap()
        }
    }

    #[async_trait]
    impl ModelInvoker for RecordingInvoker {
        async fn invoke(&self, body: &RequestEnvelope) -> Result<InvocationResponse> {
            self.calls.lock().unwrap().push(body.clone());
            self.response
                .clone()
                .map_err(BedrockError::AwsServiceError)
        }

        fn model_id(&self) -> &str {
            "test.recording-model"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn test_parse_success() {
        let response = parse_response(br#"{"images":["abc"]}"#).unwrap();
        assert_eq!(response.images, vec!["abc"]);
    }

    #[test]
    fn test_parse_error_payload() {
        let err = parse_response(br#"{"images":[],"error":"blocked by content filter"}"#)
            .unwrap_err();
        match err {
            BedrockError::ResponseError(message) => {
                assert_eq!(message, "blocked by content filter")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_blank_error_is_ignored() {
        let response = parse_response(br#"{"images":["abc"],"error":""}"#).unwrap();
        assert_eq!(response.images.len(), 1);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_response(b"<html>"),
            Err(BedrockError::ResponseError(_))
        ));
    }

    #[test]
    fn test_decode_empty_response() {
        let err = decode_images(&InvocationResponse::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Response error: No images returned from the model"
        );
    }

    #[test]
    fn test_decode_images() {
        let image = DynamicImage::new_rgb8(3, 2);
        let encoded = canvas::png_base64(&image).unwrap();
        let response = InvocationResponse {
            images: vec![encoded.clone(), encoded],
            error: None,
        };

        let decoded = decode_images(&response).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].dimensions(), (3, 2));
    }
}
