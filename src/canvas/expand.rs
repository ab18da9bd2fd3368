use super::{MASK_BLACK, MASK_WHITE};
use crate::{
    error::{BedrockError, Result},
    models::ImageSize,
};
use image::{imageops, Rgb, RgbImage};

/// Neutral grey the expanded canvas starts from.
pub const EXPAND_BACKGROUND: Rgb<u8> = Rgb([235, 235, 235]);

/// Target canvas plus where the source sits inside it.
///
/// `horizontal` and `vertical` are fractions of the free space on each axis:
/// 0.0 pins the source to the left/top edge, 1.0 to the right/bottom edge.
/// Only [`CanvasSpec::new`] and [`CanvasSpec::centered`] build one, so both
/// fractions are always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    target: ImageSize,
    horizontal: f64,
    vertical: f64,
}

impl CanvasSpec {
    pub fn new(target: ImageSize, horizontal: f64, vertical: f64) -> Result<Self> {
        for (name, value) in [("horizontal", horizontal), ("vertical", vertical)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BedrockError::InvalidInput(format!(
                    "{} position must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            target,
            horizontal,
            vertical,
        })
    }

    pub fn centered(target: ImageSize) -> Self {
        Self {
            target,
            horizontal: 0.5,
            vertical: 0.5,
        }
    }

    pub fn target(&self) -> ImageSize {
        self.target
    }

    pub fn horizontal(&self) -> f64 {
        self.horizontal
    }

    pub fn vertical(&self) -> f64 {
        self.vertical
    }

    /// Paste offset for a source of the given size. Negative when the source
    /// is larger than the canvas on that axis.
    pub fn offset(&self, source_width: u32, source_height: u32) -> (i64, i64) {
        (
            axis_offset(self.target.width, source_width, self.horizontal),
            axis_offset(self.target.height, source_height, self.vertical),
        )
    }
}

fn axis_offset(target: u32, source: u32, fraction: f64) -> i64 {
    ((f64::from(target) - f64::from(source)) * fraction).round() as i64
}

/// Result of placing a source image on a larger canvas.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub image: RgbImage,
    pub mask: RgbImage,
    pub offset: (i64, i64),
}

/// Pastes `source` onto a `target`-sized canvas and builds the matching
/// preserve mask (black where the source landed, white elsewhere).
///
/// Whatever falls outside the canvas is clipped.
pub fn expand_and_position(
    source: &RgbImage,
    target: ImageSize,
    horizontal: f64,
    vertical: f64,
) -> Result<Expansion> {
    let spec = CanvasSpec::new(target, horizontal, vertical)?;
    expand_with_spec(source, &spec)
}

pub fn expand_with_spec(source: &RgbImage, spec: &CanvasSpec) -> Result<Expansion> {
    let (source_width, source_height) = source.dimensions();
    if source_width == 0 || source_height == 0 {
        return Err(BedrockError::InvalidInput(
            "source image has no pixels".into(),
        ));
    }

    let (width, height) = (spec.target.width, spec.target.height);
    let (x, y) = spec.offset(source_width, source_height);

    if source_width > width || source_height > height {
        log::warn!(
            "Source {}x{} exceeds canvas {}x{}, paste will be clipped",
            source_width,
            source_height,
            width,
            height
        );
    }

    let mut image = RgbImage::from_pixel(width, height, EXPAND_BACKGROUND);
    imageops::replace(&mut image, source, x, y);

    let keep = RgbImage::from_pixel(source_width, source_height, MASK_BLACK);
    let mut mask = RgbImage::from_pixel(width, height, MASK_WHITE);
    imageops::replace(&mut mask, &keep, x, y);

    log::debug!(
        "Expanded {}x{} to {} at offset ({}, {})",
        source_width,
        source_height,
        spec.target,
        x,
        y
    );

    Ok(Expansion {
        image,
        mask,
        offset: (x, y),
    })
}
