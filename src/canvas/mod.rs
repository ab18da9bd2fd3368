//! Local image preparation for the editing tools.
//!
//! Everything here is a pure transform on in-memory rasters: the outpainting
//! canvas and its preserve mask, the binarized inpainting mask, bounded
//! resizing, and the PNG/base64 encoding the model expects.

pub mod codec;
pub mod expand;
pub mod mask;
pub mod resize;

pub use codec::{decode_base64_image, decode_image, encode_base64, encode_png, png_base64};
pub use expand::{expand_and_position, expand_with_spec, CanvasSpec, Expansion, EXPAND_BACKGROUND};
pub use mask::{binarize_drawn_mask, MASK_THRESHOLD};
pub use resize::{bounded_dimensions, resize_to_bound, MAX_IMAGE_SIZE};

use image::Rgb;

/// Drawn strokes in an inpainting mask, preserved area in an outpainting mask.
pub const MASK_BLACK: Rgb<u8> = Rgb([0, 0, 0]);
/// Background of every mask.
pub const MASK_WHITE: Rgb<u8> = Rgb([255, 255, 255]);
