//! Header-only EXIF extraction backed by `kamadak-exif`.

use crate::domain::geo::dms_to_decimal;
use crate::utils::error::Result;
use exif::{Exif, Field, In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The subset of EXIF the map cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifSummary {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub altitude_m: Option<f64>,
    pub datetime: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub orientation: Option<u32>,
}

/// Parses the EXIF block of a container file (JPEG, TIFF, HEIF, PNG, WebP)
/// without decoding pixels.
pub fn read_container(path: &Path) -> Result<ExifSummary> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader)?;
    Ok(summarize(&exif))
}

/// Parses a bare TIFF-structured EXIF block, as handed out by image decoders.
pub fn read_raw(data: Vec<u8>) -> Result<ExifSummary> {
    let exif = exif::Reader::new().read_raw(data)?;
    Ok(summarize(&exif))
}

/// Orientation tag (1..=8) of a file, if present and valid.
pub fn read_orientation(path: &Path) -> Option<u32> {
    read_container(path).ok()?.orientation
}

fn summarize(exif: &Exif) -> ExifSummary {
    let field = |tag: Tag| exif.get_field(tag, In::PRIMARY);

    let lat_ref = field(Tag::GPSLatitudeRef).and_then(ascii_value);
    let lon_ref = field(Tag::GPSLongitudeRef).and_then(ascii_value);

    let (lat, lon) = match (field(Tag::GPSLatitude), field(Tag::GPSLongitude)) {
        (Some(lat), Some(lon)) => (
            rationals(lat).and_then(|dms| dms_to_decimal(&dms, lat_ref.as_deref())),
            rationals(lon).and_then(|dms| dms_to_decimal(&dms, lon_ref.as_deref())),
        ),
        _ => (None, None),
    };

    let altitude_m = field(Tag::GPSAltitude)
        .and_then(rationals)
        .and_then(|parts| parts.first().copied())
        .filter(|(_, den)| *den != 0.0)
        .map(|(num, den)| {
            let below_sea_level = field(Tag::GPSAltitudeRef)
                .and_then(|f| f.value.get_uint(0))
                .is_some_and(|r| r == 1);
            let metres = num / den;
            if below_sea_level {
                -metres
            } else {
                metres
            }
        });

    let datetime = field(Tag::DateTimeOriginal)
        .and_then(ascii_value)
        .or_else(|| field(Tag::DateTime).and_then(ascii_value));

    let orientation = field(Tag::Orientation)
        .and_then(|f| f.value.get_uint(0))
        .filter(|o| (1..=8).contains(o));

    ExifSummary {
        lat,
        lon,
        altitude_m,
        datetime,
        make: field(Tag::Make).and_then(ascii_value),
        model: field(Tag::Model).and_then(ascii_value),
        orientation,
    }
}

/// First ASCII component with NUL padding and surrounding whitespace removed.
fn ascii_value(field: &Field) -> Option<String> {
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string()
            })
            .find(|s| !s.is_empty()),
        _ => None,
    }
}

fn rationals(field: &Field) -> Option<Vec<(f64, f64)>> {
    match &field.value {
        Value::Rational(values) => Some(
            values
                .iter()
                .map(|r| (f64::from(r.num), f64::from(r.denom)))
                .collect(),
        ),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{jpeg_with_exif, sydney_tiff};
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_raw_block_fields() {
        let summary = read_raw(sydney_tiff(1)).unwrap();

        assert!((summary.lat.unwrap() + 33.86).abs() < 1e-6);
        assert!((summary.lon.unwrap() - 151.215).abs() < 1e-6);
        assert_eq!(summary.altitude_m, Some(-12.5));
        assert_eq!(summary.datetime.as_deref(), Some("2019:12:31 23:59:00"));
        assert_eq!(summary.make.as_deref(), Some("Canon"));
        assert_eq!(summary.model.as_deref(), Some("EOS 5D"));
        assert_eq!(summary.orientation, Some(1));
    }

    #[test]
    fn test_container_orientation() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&jpeg_with_exif(40, 20, &sydney_tiff(6))).unwrap();

        assert_eq!(read_orientation(file.path()), Some(6));
        assert_eq!(read_container(file.path()).unwrap().orientation, Some(6));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_container(Path::new("/definitely/not/here.jpg")).is_err());
    }

    #[test]
    fn test_non_image_has_no_exif() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"plain text, not a photo").unwrap();

        assert!(read_container(file.path()).is_err());
        assert_eq!(read_orientation(file.path()), None);
    }

    #[test]
    fn test_garbage_raw_block_is_an_error() {
        assert!(read_raw(vec![0, 1, 2, 3]).is_err());
    }
}
