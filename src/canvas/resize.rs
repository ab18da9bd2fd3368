use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Longest side accepted by the inpainting task.
pub const MAX_IMAGE_SIZE: u32 = 1024;

/// Dimensions after shrinking so neither side exceeds `max_side`.
///
/// The longer side becomes exactly `max_side`; the shorter one keeps the
/// aspect ratio, rounded down.
pub fn bounded_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    if width <= max_side && height <= max_side {
        return (width, height);
    }

    let scaled = |short: u32, long: u32| -> u32 {
        ((f64::from(short) / f64::from(long)) * f64::from(max_side)).floor() as u32
    };

    if width > height {
        (max_side, scaled(height, width).max(1))
    } else {
        (scaled(width, height).max(1), max_side)
    }
}

pub fn resize_to_bound(image: &DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = bounded_dimensions(width, height, max_side);

    if (new_width, new_height) == (width, height) {
        return image.clone();
    }

    log::info!(
        "Resized image from {}x{} to {}x{}",
        width,
        height,
        new_width,
        new_height
    );
    image.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_images_are_untouched() {
        assert_eq!(bounded_dimensions(800, 600, 1024), (800, 600));
        assert_eq!(bounded_dimensions(1024, 1024, 1024), (1024, 1024));
    }

    #[test]
    fn test_landscape_is_bounded_by_width() {
        assert_eq!(bounded_dimensions(2048, 1536, 1024), (1024, 768));
        assert_eq!(bounded_dimensions(3000, 1000, 1024), (1024, 341));
    }

    #[test]
    fn test_portrait_and_square_are_bounded_by_height() {
        assert_eq!(bounded_dimensions(1000, 3000, 1024), (341, 1024));
        assert_eq!(bounded_dimensions(2000, 2000, 1024), (1024, 1024));
    }

    #[test]
    fn test_extreme_aspect_keeps_one_pixel() {
        assert_eq!(bounded_dimensions(5000, 2, 1024), (1024, 1));
    }

    #[test]
    fn test_resize_to_bound() {
        let image = DynamicImage::new_rgb8(1200, 600);
        let resized = resize_to_bound(&image, MAX_IMAGE_SIZE);
        assert_eq!(resized.dimensions(), (1024, 512));

        let small = DynamicImage::new_rgb8(300, 200);
        assert_eq!(resize_to_bound(&small, MAX_IMAGE_SIZE).dimensions(), (300, 200));
    }
}
