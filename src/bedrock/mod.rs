pub mod image_client;
pub mod invoker;

use crate::{config::BedrockConfig, error::Result};
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::{
    config::{Credentials, Region},
    Client,
};

pub use image_client::ImageClient;
pub use invoker::{decode_images, parse_response, ModelInvoker};

#[derive(Clone)]
pub struct BedrockClient {
    image_client: ImageClient,
}

impl BedrockClient {
    /// Builds the SDK client. Explicit credentials win over the default
    /// provider chain.
    pub async fn new(bedrock_config: BedrockConfig) -> Result<Self> {
        let region = bedrock_config.region_or_default().to_string();
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));

        if let (Some(access_key), Some(secret_key)) =
            (&bedrock_config.access_key, &bedrock_config.secret_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "nova-studio",
            ));
        }

        let aws_config = loader.load().await;
        let client = Client::new(&aws_config);

        Ok(Self {
            image_client: ImageClient::new(client, bedrock_config.model_id_or_default()),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
