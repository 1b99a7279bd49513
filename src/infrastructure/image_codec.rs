//! 图片编解码：解码、裁剪、PNG 编码、data URL

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{imageops, DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::error::AppResult;
use crate::models::PixelBox;

/// 从内存解码图片
pub fn decode(bytes: &[u8]) -> AppResult<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// 按像素框裁剪，超出图片的部分会被截掉
pub fn crop(image: &DynamicImage, bbox: &PixelBox) -> DynamicImage {
    let x1 = bbox.x1.min(image.width());
    let y1 = bbox.y1.min(image.height());
    let width = bbox.x2.min(image.width()).saturating_sub(x1);
    let height = bbox.y2.min(image.height()).saturating_sub(y1);

    DynamicImage::ImageRgba8(imageops::crop_imm(image, x1, y1, width, height).to_image())
}

/// 编码为 PNG 字节
pub fn encode_png(image: &DynamicImage) -> AppResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// 编码为 `data:image/png;base64,...`，用于视觉模型的图片输入
pub fn to_data_url(image: &DynamicImage) -> AppResult<String> {
    let png = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbaImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255]);
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_crop_region() {
        let img = sample(100, 80);
        let cropped = crop(&img, &PixelBox::new(10, 20, 60, 50));
        assert_eq!((cropped.width(), cropped.height()), (50, 30));
        assert_eq!(cropped.to_rgba8().get_pixel(0, 0), &Rgba([10, 20, 0, 255]));
    }

    #[test]
    fn test_crop_clamps_to_image() {
        let img = sample(100, 80);
        let cropped = crop(&img, &PixelBox::new(90, 70, 500, 500));
        assert_eq!((cropped.width(), cropped.height()), (10, 10));
    }

    #[test]
    fn test_png_data_url_decodes_back() {
        let img = sample(4, 3);
        let url = to_data_url(&img).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();

        let bytes = BASE64.decode(payload).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(b"definitely not an image").is_err());
    }
}
