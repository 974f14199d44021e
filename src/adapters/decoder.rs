//! Fallback metadata source: ask the image decoder for its embedded EXIF block.

use crate::adapters::exif_reader::{self, ExifSummary};
use crate::utils::error::Result;
use image::{ImageDecoder, ImageReader};
use std::path::Path;

/// Opens the file with the format sniffed from its content and parses the decoder's EXIF.
///
/// `Ok(None)` means the format was understood but carries no EXIF.
pub fn read_embedded_exif(path: &Path) -> Result<Option<ExifSummary>> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;

    match decoder.exif_metadata()? {
        Some(raw) => Ok(Some(exif_reader::read_raw(raw)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_png_without_exif() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        assert_eq!(read_embedded_exif(&path).unwrap(), None);
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.heic");
        std::fs::write(&path, b"not really an image").unwrap();

        assert!(read_embedded_exif(&path).is_err());
    }
}
