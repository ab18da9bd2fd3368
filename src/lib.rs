//! Image tools for Amazon Bedrock's Nova Canvas model.
//!
//! The [`tools`] modules map user inputs onto the model's request bodies,
//! [`canvas`] does the local compositing the editing tools need, and
//! [`bedrock`] sends the bodies and decodes the returned images.

pub mod bedrock;
pub mod canvas;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod tools;

pub use bedrock::{BedrockClient, ImageClient, ModelInvoker};
pub use config::{BedrockConfig, Config};
pub use error::{BedrockError, Result};
pub use models::*;
