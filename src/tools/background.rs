use super::{inspect_upload, Prepared};
use crate::{
    bedrock::ModelInvoker,
    canvas,
    error::Result,
    models::{BackgroundRemovalParams, GeneratedImages, RequestEnvelope},
};

#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub image: Option<Vec<u8>>,
}

pub fn prepare_request_body(image: &[u8]) -> RequestEnvelope {
    RequestEnvelope::BackgroundRemoval {
        background_removal_params: BackgroundRemovalParams {
            image: canvas::encode_base64(image),
        },
    }
}

pub fn prepare(inputs: &Inputs) -> Result<Option<Prepared>> {
    let Some(image) = &inputs.image else {
        log::debug!("Background removal skipped: no image uploaded");
        return Ok(None);
    };

    inspect_upload(image)?;
    Ok(Some(Prepared::new(prepare_request_body(image))))
}

pub async fn run(invoker: &dyn ModelInvoker, inputs: &Inputs) -> Result<Option<GeneratedImages>> {
    super::execute(invoker, prepare(inputs)?).await
}
