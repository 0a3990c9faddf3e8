//! SIMD-accelerated grayscale downscaling.
//!
//! Uses fast_image_resize, which picks AVX2/NEON kernels when available.
//! Fingerprints use Lanczos3: the hash compares neighbouring pixels, so a
//! filter that keeps edges sharp matters more than speed here.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Reusable resizer
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    /// Create a resizer using Lanczos3
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Convert to single-channel grayscale, then resize to `width` x `height`
    pub fn resize_to_grayscale(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        let gray = image.to_luma8();
        let (src_width, src_height) = gray.dimensions();

        if src_width == 0 || src_height == 0 {
            return Err(HashError::ComputationFailed(
                "source image has no pixels".to_string(),
            ));
        }

        if width == 0 || height == 0 {
            return Err(HashError::ComputationFailed(format!(
                "invalid target size {}x{}",
                width, height
            )));
        }

        let src_image = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| HashError::ComputationFailed(format!("source buffer: {}", e)))?;

        let mut dst_image = Image::new(width, height, PixelType::U8);

        let options =
            ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| HashError::ComputationFailed(format!("resize failed: {}", e)))?;

        ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(width, height, dst_image.into_vec())
            .ok_or_else(|| HashError::ComputationFailed("result buffer size mismatch".to_string()))
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn resize_to_grayscale(
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        FastResizer::new().resize_to_grayscale(image, width, height)
    }

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            Rgb([r, g, 64])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let image = create_test_image(200, 100);
        let resized = resize_to_grayscale(&image, 17, 16).unwrap();

        assert_eq!(resized.dimensions(), (17, 16));
    }

    #[test]
    fn upscaling_small_images_works() {
        let image = create_test_image(3, 2);
        let resized = resize_to_grayscale(&image, 9, 8).unwrap();

        assert_eq!(resized.dimensions(), (9, 8));
    }

    #[test]
    fn uniform_image_stays_uniform() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 64, Rgb([0, 0, 0])));
        let resized = resize_to_grayscale(&image, 9, 8).unwrap();

        let first = resized.get_pixel(0, 0)[0];
        assert!(resized.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn zero_target_size_is_rejected() {
        let image = create_test_image(10, 10);
        assert!(resize_to_grayscale(&image, 0, 8).is_err());
    }

    #[test]
    fn resizer_reuse_is_deterministic() {
        let mut resizer = FastResizer::new();
        let image = create_test_image(100, 100);

        let first = resizer.resize_to_grayscale(&image, 9, 8).unwrap();
        let second = resizer.resize_to_grayscale(&image, 9, 8).unwrap();

        assert_eq!(first.as_raw(), second.as_raw());
    }
}
