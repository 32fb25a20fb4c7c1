//! Image → normalized CHW tensor, matching the torchvision ImageNet transform
//! (resize to a square, scale to `[0, 1]`, per-channel mean/std).

use image::imageops::FilterType;

use crate::error_handler::Result;

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Resizes and normalizes RGB images into a flat CHW `f32` buffer.
///
/// Normalization is folded into `value * alpha + beta` per channel, with
/// `alpha = scale / std` and `beta = -mean / std`.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    size: u32,
    alpha: [f32; 3],
    beta: [f32; 3],
}

impl ImagePreprocessor {
    pub fn new(size: u32, mean: [f32; 3], std: [f32; 3]) -> Self {
        let scale = 1.0 / 255.0;
        let alpha = [scale / std[0], scale / std[1], scale / std[2]];
        let beta = [-mean[0] / std[0], -mean[1] / std[1], -mean[2] / std[2]];
        Self { size, alpha, beta }
    }

    pub fn imagenet(size: u32) -> Self {
        Self::new(size, IMAGENET_MEAN, IMAGENET_STD)
    }

    /// Tensor shape `[batch, channels, height, width]` for a single image.
    pub fn shape(&self) -> [u64; 4] {
        [1, 3, self.size as u64, self.size as u64]
    }

    /// Decodes `bytes` (any format the `image` crate understands) and returns
    /// `3 * size * size` values in channel-major order.
    pub fn to_chw(&self, bytes: &[u8]) -> Result<Vec<f32>> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let resized = image::imageops::resize(&rgb, self.size, self.size, FilterType::Triangle);

        let side = self.size as usize;
        let plane = side * side;
        let mut out = vec![0.0f32; 3 * plane];
        for (i, px) in resized.pixels().enumerate() {
            for c in 0..3 {
                out[c * plane + i] = px[c] as f32 * self.alpha[c] + self.beta[c];
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn produces_chw_layout_of_requested_size() {
        let pre = ImagePreprocessor::imagenet(8);
        let tensor = pre.to_chw(&png(20, 12, [255, 0, 0])).unwrap();
        assert_eq!(tensor.len(), 3 * 8 * 8);
        assert_eq!(pre.shape(), [1, 3, 8, 8]);

        let red = (1.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        let green = -IMAGENET_MEAN[1] / IMAGENET_STD[1];
        assert!((tensor[0] - red).abs() < 1e-3);
        assert!((tensor[64] - green).abs() < 1e-3);
    }

    #[test]
    fn rejects_non_image_bytes() {
        let pre = ImagePreprocessor::imagenet(4);
        assert!(pre.to_chw(b"definitely not an image").is_err());
    }
}
