use crate::logger::LogLevel;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MODEL_ID: &str = "amazon.nova-canvas-v1:0";
pub const DEFAULT_MODEL_NAME: &str = "Amazon Bedrock - Nova Canvas";
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub model_id: Option<String>,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
            model_id: None,
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `BEDROCK_REGION` (falling back to `AWS_REGION`), the standard AWS
    /// key pair and `BEDROCK_MODEL_ID`. Missing values stay `None`.
    pub fn from_env() -> Self {
        let region = env::var("BEDROCK_REGION")
            .or_else(|_| env::var("AWS_REGION"))
            .ok();
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok();
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY").ok();
        let model_id = env::var("BEDROCK_MODEL_ID").ok();

        BedrockConfig {
            region,
            access_key,
            secret_key,
            model_id,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn model_id_or_default(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_MODEL_ID)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bedrock: BedrockConfig,
    pub output_dir: PathBuf,
    pub log_level: LogLevel,
    /// Emit log entries as JSON lines instead of coloured text.
    pub log_json: bool,
    /// Also append log entries to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bedrock: BedrockConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_level: LogLevel::Info,
            log_json: false,
            log_file: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let output_dir = env::var("NOVA_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let log_level = env::var("NOVA_LOG_LEVEL")
            .ok()
            .and_then(|level| LogLevel::parse(&level))
            .unwrap_or(LogLevel::Info);
        let log_json = env::var("NOVA_LOG_JSON")
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        let log_file = env::var("NOVA_LOG_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Config {
            bedrock: BedrockConfig::from_env(),
            output_dir,
            log_level,
            log_json,
            log_file,
        }
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = config;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_log_json(mut self, enabled: bool) -> Self {
        self.log_json = enabled;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
