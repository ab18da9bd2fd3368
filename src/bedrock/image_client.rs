use super::invoker::{parse_response, ModelInvoker};
use crate::{
    config::{DEFAULT_MODEL_ID, DEFAULT_MODEL_NAME},
    error::{BedrockError, Result},
    logger,
    models::{InvocationResponse, ModelInfo, RequestEnvelope},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{
    config::http::HttpResponse,
    error::{ProvideErrorMetadata, SdkError},
    operation::invoke_model::InvokeModelError,
    primitives::Blob,
    Client,
};

const ALL_TASKS: [&str; 4] = ["TEXT_IMAGE", "INPAINTING", "OUTPAINTING", "BACKGROUND_REMOVAL"];

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    model_id: String,
}

impl ImageClient {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: DEFAULT_MODEL_ID.to_string(),
            name: DEFAULT_MODEL_NAME.to_string(),
            provider: "Amazon".to_string(),
            tasks: ALL_TASKS.iter().map(|task| task.to_string()).collect(),
        }]
    }
}

#[async_trait]
impl ModelInvoker for ImageClient {
    async fn invoke(&self, body: &RequestEnvelope) -> Result<InvocationResponse> {
        let request_json = body.to_json()?;

        log::info!(
            "Invoking model {} for task {}",
            self.model_id,
            body.task_type()
        );
        log::debug!("Request payload size: {} bytes", request_json.len());

        let _timer = logger::timer(&format!("{} invocation", body.task_type()));

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(map_invoke_error)?;

        parse_response(&response.body.into_inner())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Service errors keep the service's code and message, anything else (dispatch,
/// timeout, construction) is reported as a generic AWS failure.
fn map_invoke_error(e: SdkError<InvokeModelError, HttpResponse>) -> BedrockError {
    log::error!("Error invoking model: {:?}", e);

    if let Some(service_error) = e.as_service_error() {
        BedrockError::AwsServiceError(format!(
            "{} - {}",
            service_error.code().unwrap_or("unknown"),
            service_error.message().unwrap_or("no message")
        ))
    } else {
        BedrockError::AwsError(e.to_string())
    }
}
