use image::{ImageEncoder, RgbaImage, codecs::png::PngEncoder};
use std::path::Path;

use crate::export::ExportError;

/// Save as PNG, keeping the alpha channel losslessly.
pub fn save(image: &RgbaImage, path: &Path) -> Result<(), ExportError> {
    let output = std::fs::File::create(path)?;
    let encoder = PngEncoder::new(output);
    encoder.write_image(
        image,
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn test_alpha_survives_exactly() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alpha.png");

        let mut img = RgbaImage::from_pixel(16, 16, Rgba([255, 128, 64, 128]));
        img.put_pixel(3, 4, Rgba([1, 2, 3, 0]));
        img.put_pixel(5, 6, Rgba([9, 8, 7, 255]));

        save(&img, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }
}
