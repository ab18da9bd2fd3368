pub mod common;
pub mod request;

pub use common::*;
pub use request::*;
