use crate::domain::model::{PhotoMeta, ScanStats};
use crate::report::geojson::{opt_string, Feature, FeatureCollection};
use crate::utils::error::{PhotoMapError, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};

const CSV_BASE_COLUMNS: [&str; 6] = ["path", "lat", "lon", "datetime", "make", "model"];

/// Holds every scanned photo plus the list of photos without coordinates,
/// and renders them into the GeoJSON, CSV and skipped-list reports.
#[derive(Debug, Default)]
pub struct PhotoRepository {
    items: Vec<PhotoMeta>,
    skipped: Vec<PathBuf>,
}

impl PhotoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, meta: PhotoMeta) {
        self.items.push(meta);
    }

    pub fn skip(&mut self, path: PathBuf) {
        self.skipped.push(path);
    }

    pub fn located(&self) -> impl Iterator<Item = &PhotoMeta> {
        self.items.iter().filter(|m| m.has_gps())
    }

    /// `(lat, lon)` of every located photo.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.items.iter().filter_map(PhotoMeta::coordinates).collect()
    }

    pub fn stats(&self) -> ScanStats {
        let with_gps = self.located().count();
        ScanStats {
            scanned: self.items.len(),
            with_gps,
            without_gps: self.items.len() - with_gps,
        }
    }

    /// Features for located photos. `html_dir` is where the map page lives; `img_rel`
    /// is computed relative to it so the page can open originals.
    pub fn to_geojson(&self, html_dir: &Path, thumbs: &HashMap<PathBuf, String>) -> FeatureCollection {
        let features = self
            .items
            .iter()
            .filter_map(|meta| {
                let (lat, lon) = meta.coordinates()?;

                let mut props = Map::new();
                props.insert("path".to_string(), Value::String(meta.file_name()));
                props.insert("datetime".to_string(), opt_string(meta.datetime.as_deref()));
                props.insert("make".to_string(), opt_string(meta.make.as_deref()));
                props.insert("model".to_string(), opt_string(meta.model.as_deref()));
                for (key, value) in &meta.extra {
                    props.insert(key.clone(), Value::String(value.clone()));
                }
                props.insert(
                    "thumb".to_string(),
                    opt_string(thumbs.get(&meta.path).map(String::as_str)),
                );
                props.insert(
                    "img_rel".to_string(),
                    opt_string(relative_path(html_dir, &meta.path).as_deref()),
                );

                Some(Feature::point(lat, lon, props))
            })
            .collect();

        FeatureCollection::new(features)
    }

    /// One row per scanned photo. Extra metadata keys become trailing columns in sorted order.
    pub fn to_csv(&self) -> Result<String> {
        let extra_keys: BTreeSet<&str> = self
            .items
            .iter()
            .flat_map(|m| m.extra.keys().map(String::as_str))
            .collect();

        let mut writer = csv::Writer::from_writer(Vec::new());

        let header: Vec<&str> = CSV_BASE_COLUMNS
            .iter()
            .copied()
            .chain(extra_keys.iter().copied())
            .collect();
        writer.write_record(&header)?;

        for meta in &self.items {
            let mut row = vec![
                meta.path.to_string_lossy().into_owned(),
                meta.lat.map(|v| v.to_string()).unwrap_or_default(),
                meta.lon.map(|v| v.to_string()).unwrap_or_default(),
                meta.datetime.clone().unwrap_or_default(),
                meta.make.clone().unwrap_or_default(),
                meta.model.clone().unwrap_or_default(),
            ];
            row.extend(
                extra_keys
                    .iter()
                    .map(|key| meta.extra.get(*key).cloned().unwrap_or_default()),
            );
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PhotoMapError::processing(format!("CSV flush failed: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| PhotoMapError::processing(format!("CSV is not UTF-8: {}", e)))
    }

    /// Skipped paths, one per line, without a trailing newline.
    pub fn skipped_listing(&self) -> String {
        self.skipped
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Browser-friendly path from `from_dir` to `file`, `/`-separated and allowed to climb
/// with `../` (photos usually live in a sibling of the output directory).
pub fn relative_path(from_dir: &Path, file: &Path) -> Option<String> {
    let from = absolutize(from_dir)?;
    let target = absolutize(file)?;
    let rel = pathdiff::diff_paths(target, from)?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

fn absolutize(path: &Path) -> Option<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Some(normalized)
}
