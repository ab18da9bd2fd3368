use super::{MASK_BLACK, MASK_WHITE};
use image::{Rgba, RgbImage, RgbaImage};

pub const MASK_THRESHOLD: u8 = 128;

/// Turns a layer of user strokes into the strictly black/white mask the
/// inpainting task expects.
///
/// The layer is composited over opaque white using its alpha, then every
/// channel is thresholded at [`MASK_THRESHOLD`]. A pixel with any channel
/// below the threshold becomes black (to be repainted), the rest white.
pub fn binarize_drawn_mask(stroke_layer: &RgbaImage) -> RgbImage {
    let (width, height) = stroke_layer.dimensions();
    let mut mask = RgbImage::new(width, height);

    for (x, y, px) in stroke_layer.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *px;
        let drawn = [r, g, b]
            .into_iter()
            .any(|channel| composite_on_white(channel, a) < MASK_THRESHOLD);
        mask.put_pixel(x, y, if drawn { MASK_BLACK } else { MASK_WHITE });
    }

    mask
}

fn composite_on_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u32::from(channel), u32::from(alpha));
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
