use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Metadata read from a single photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMeta {
    pub path: PathBuf,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub datetime: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl PhotoMeta {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lat: None,
            lon: None,
            datetime: None,
            make: None,
            model: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// `(lat, lon)` when both halves are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }

    pub fn has_gps(&self) -> bool {
        self.coordinates().is_some()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub scanned: usize,
    pub with_gps: usize,
    pub without_gps: usize,
}

/// A file to be written under the output directory.
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// Path relative to the output directory, `/`-separated.
    pub relative_path: String,
    pub data: Vec<u8>,
}

impl OutputFile {
    pub fn new(relative_path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            data: data.into(),
        }
    }
}

/// Everything the transform phase produced, ready to be persisted.
#[derive(Debug, Clone)]
pub struct MapArtifacts {
    pub stats: ScanStats,
    pub html_file_name: String,
    pub html: String,
    pub geojson: String,
    pub csv: Option<String>,
    pub skipped: Option<String>,
    pub thumbnails: Vec<OutputFile>,
    pub demo: bool,
}

impl MapArtifacts {
    pub fn file_count(&self) -> usize {
        2 + usize::from(self.csv.is_some())
            + usize::from(self.skipped.is_some())
            + self.thumbnails.len()
    }
}

/// Outcome of a full run, reported back to the binaries.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub html_path: PathBuf,
    pub output_dir: PathBuf,
    pub stats: ScanStats,
    pub demo: bool,
    pub files_written: usize,
}

impl RunReport {
    pub fn skipped_list_path(&self) -> PathBuf {
        self.output_dir.join(crate::domain::SKIPPED_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_require_both_halves() {
        let mut meta = PhotoMeta::new("img/a.jpg");
        assert!(!meta.has_gps());

        meta.lat = Some(1.0);
        assert_eq!(meta.coordinates(), None);

        meta.lon = Some(2.0);
        assert_eq!(meta.coordinates(), Some((1.0, 2.0)));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(PhotoMeta::new("img/trip/IMG_0001.JPG").file_name(), "IMG_0001.JPG");
    }
}
