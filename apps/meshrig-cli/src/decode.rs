use meshrig_common::DecodedImage;
use meshrig_render::ImageDecoder;

/// Decodes PNG/JPEG with the `image` crate, flipped so row 0 is the bottom.
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    type Error = image::ImageError;

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, Self::Error> {
        let rgba = image::load_from_memory(bytes)?.flipv().to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(DecodedImage::new(width, height, rgba.into_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn png_is_flipped_to_bottom_origin() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let decoded = FileDecoder.decode(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(decoded.pixels.len(), decoded.expected_len());
        // Top-left red pixel now sits on the last row.
        assert_eq!(&decoded.pixels[..4], &[0, 0, 255, 255]);
        assert_eq!(&decoded.pixels[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(FileDecoder.decode(b"not an image").is_err());
    }
}
