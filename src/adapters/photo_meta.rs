use crate::adapters::{decoder, exif_reader, sidecar};
use crate::domain::geo::drop_zero_coordinate;
use crate::domain::model::PhotoMeta;
use std::path::Path;

pub const ALTITUDE_KEY: &str = "altitude_m";

/// Collects metadata for one photo. Never fails; a file nothing could be read from
/// comes back without GPS.
///
/// Sources, each only filling gaps left by the previous one:
/// 1. the EXIF container parser (header only),
/// 2. a Google Takeout sidecar JSON,
/// 3. the image decoder's embedded EXIF, consulted only when (1) found no EXIF at all
///    and coordinates are still missing.
pub fn read_photo_meta(path: &Path) -> PhotoMeta {
    let mut meta = PhotoMeta::new(path);

    let primary = match exif_reader::read_container(path) {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::trace!("No EXIF container in {}: {}", path.display(), e);
            None
        }
    };

    if let Some(summary) = &primary {
        meta.lat = summary.lat;
        meta.lon = summary.lon;
        meta.datetime = summary.datetime.clone();
        meta.make = summary.make.clone();
        meta.model = summary.model.clone();
        if let Some(altitude) = summary.altitude_m {
            meta.extra.insert(ALTITUDE_KEY.to_string(), altitude.to_string());
        }
    }

    let side = sidecar::read_sidecar(path);
    meta.lat = meta.lat.or(side.lat);
    meta.lon = meta.lon.or(side.lon);
    meta.datetime = meta.datetime.take().or(side.datetime);

    if primary.is_none() && !meta.has_gps() {
        match decoder::read_embedded_exif(path) {
            Ok(Some(fallback)) => {
                meta.lat = meta.lat.or(fallback.lat);
                meta.lon = meta.lon.or(fallback.lon);
                meta.datetime = meta.datetime.take().or(fallback.datetime);
                meta.make = meta.make.take().or(fallback.make);
                meta.model = meta.model.take().or(fallback.model);
                if let Some(altitude) = fallback.altitude_m {
                    meta.extra
                        .entry(ALTITUDE_KEY.to_string())
                        .or_insert_with(|| altitude.to_string());
                }
            }
            Ok(None) => {}
            Err(e) => tracing::trace!("Decoder fallback failed for {}: {}", path.display(), e),
        }
    }

    let (lat, lon) = drop_zero_coordinate(meta.lat, meta.lon);
    meta.lat = lat;
    meta.lon = lon;

    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::exif_reader::fixtures::{jpeg_with_exif, sydney_tiff};
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_supplies_coordinates_for_plain_png() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("beach.png");
        image::RgbImage::new(8, 8).save(&photo).unwrap();
        std::fs::write(
            dir.path().join("beach.png.json"),
            r#"{"geoData": {"latitude": -33.8568, "longitude": 151.2153},
                "photoTakenTime": {"formatted": "Dec 31, 2019"}}"#,
        )
        .unwrap();

        let meta = read_photo_meta(&photo);
        assert_eq!(meta.coordinates(), Some((-33.8568, 151.2153)));
        assert_eq!(meta.datetime.as_deref(), Some("Dec 31, 2019"));
        assert_eq!(meta.make, None);
    }

    #[test]
    fn test_zero_coordinates_are_dropped() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("nofix.png");
        image::RgbImage::new(8, 8).save(&photo).unwrap();
        std::fs::write(
            dir.path().join("nofix.json"),
            r#"{"geoData": {"latitude": 0.0, "longitude": 0.0},
                "photoTakenTime": {"timestamp": "1600000000"}}"#,
        )
        .unwrap();

        let meta = read_photo_meta(&photo);
        assert!(!meta.has_gps());
        assert_eq!(meta.datetime.as_deref(), Some("1600000000"));
    }

    #[test]
    fn test_jpeg_exif_fills_every_field() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("harbour.jpg");
        std::fs::write(&photo, jpeg_with_exif(40, 20, &sydney_tiff(1))).unwrap();

        let meta = read_photo_meta(&photo);
        let (lat, lon) = meta.coordinates().unwrap();
        assert!((lat + 33.86).abs() < 1e-6);
        assert!((lon - 151.215).abs() < 1e-6);
        assert_eq!(meta.datetime.as_deref(), Some("2019:12:31 23:59:00"));
        assert_eq!(meta.make.as_deref(), Some("Canon"));
        assert_eq!(meta.model.as_deref(), Some("EOS 5D"));
        assert_eq!(meta.extra.get(ALTITUDE_KEY).map(String::as_str), Some("-12.5"));
    }

    #[test]
    fn test_unreadable_file_has_no_gps() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("broken.jpg");
        std::fs::write(&photo, b"\xff\xd8 truncated").unwrap();

        let meta = read_photo_meta(&photo);
        assert_eq!(meta.path, photo);
        assert!(!meta.has_gps());
        assert!(meta.extra.is_empty());
    }
}
