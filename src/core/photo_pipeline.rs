use crate::adapters::{read_photo_meta, scan_images};
use crate::config::output_dir_for;
use crate::domain::model::{MapArtifacts, OutputFile, PhotoMeta, RunReport};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::{CSV_FILE, GEOJSON_FILE, SKIPPED_FILE};
use crate::map::MapBuilder;
use crate::report::PhotoRepository;
use crate::thumbnails::make_thumbnails;
use crate::utils::error::{catch_panic, PhotoMapError, Result};
use std::path::{Path, PathBuf};

/// Scans a photo folder and turns it into the map page plus its reports.
pub struct PhotoPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> PhotoPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn html_file_name(&self) -> String {
        self.config
            .output_html()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "map.html".to_string())
    }
}

/// Reads metadata for every path. A reader panic on one file is logged and that
/// photo is kept without GPS.
fn read_all(paths: &[PathBuf], read: fn(&Path) -> PhotoMeta) -> Vec<PhotoMeta> {
    paths
        .iter()
        .map(|path| {
            let meta = catch_panic(|| read(path)).unwrap_or_else(|e| {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                PhotoMeta::new(path)
            });
            match meta.coordinates() {
                Some((lat, lon)) => {
                    tracing::debug!("OK: {} -> ({:.6}, {:.6})", path.display(), lat, lon)
                }
                None => tracing::debug!("NO GPS: {}", path.display()),
            }
            meta
        })
        .collect()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PhotoPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<PhotoMeta>> {
        let images_dir = self.config.images_dir().to_path_buf();
        if !images_dir.is_dir() {
            return Err(PhotoMapError::ImagesDirNotFound { path: images_dir });
        }

        let allowed_exts = self.config.allowed_exts().to_vec();
        let recurse = self.config.recurse();
        let limit = self.config.limit();

        tracing::debug!(
            "Scanning {} (recurse={}, limit={}, exts={:?})",
            images_dir.display(),
            recurse,
            limit,
            allowed_exts
        );

        let photos = tokio::task::spawn_blocking(move || {
            let paths = scan_images(&images_dir, &allowed_exts, recurse, limit);
            read_all(&paths, read_photo_meta)
        })
        .await?;

        Ok(photos)
    }

    async fn transform(&self, photos: Vec<PhotoMeta>) -> Result<MapArtifacts> {
        let mut repository = PhotoRepository::new();
        for meta in photos {
            if !meta.has_gps() {
                repository.skip(meta.path.clone());
            }
            repository.add(meta);
        }
        let stats = repository.stats();

        let located: Vec<PathBuf> = repository.located().map(|m| m.path.clone()).collect();
        let thumbs = make_thumbnails(&self.storage, located, self.config.thumbnail_options()).await?;
        if thumbs.failed > 0 {
            tracing::warn!("{} photos could not be thumbnailed", thumbs.failed);
        }

        let html_dir = output_dir_for(self.config.output_html());
        let features = repository.to_geojson(&html_dir, &thumbs.mapping);
        let geojson = serde_json::to_string_pretty(&features)?;
        let csv = repository.to_csv()?;

        let html = MapBuilder::new(self.config.map_options()).build(&repository.points(), &features)?;

        Ok(MapArtifacts {
            stats,
            html_file_name: self.html_file_name(),
            html,
            geojson,
            csv: Some(csv),
            skipped: Some(repository.skipped_listing()),
            thumbnails: thumbs.rendered,
            demo: false,
        })
    }

    async fn load(&self, artifacts: MapArtifacts) -> Result<RunReport> {
        let files_written = artifacts.file_count();
        tracing::debug!("Writing {} files", files_written);

        for thumb in &artifacts.thumbnails {
            self.storage
                .write_file(&thumb.relative_path, &thumb.data)
                .await?;
        }

        let mut reports = vec![OutputFile::new(GEOJSON_FILE, artifacts.geojson)];
        if let Some(csv) = artifacts.csv {
            reports.push(OutputFile::new(CSV_FILE, csv));
        }
        if let Some(skipped) = artifacts.skipped {
            reports.push(OutputFile::new(SKIPPED_FILE, skipped));
        }
        reports.push(OutputFile::new(artifacts.html_file_name, artifacts.html));

        for file in &reports {
            self.storage.write_file(&file.relative_path, &file.data).await?;
            tracing::debug!("Wrote {}", file.relative_path);
        }

        Ok(RunReport {
            html_path: self.config.output_html().to_path_buf(),
            output_dir: output_dir_for(self.config.output_html()),
            stats: artifacts.stats,
            demo: false,
            files_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_allowed_exts;
    use crate::map::MapOptions;
    use crate::thumbnails::ThumbnailOptions;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }
    }

    struct MockConfig {
        images_dir: PathBuf,
        output_html: PathBuf,
        allowed_exts: Vec<String>,
        limit: usize,
    }

    impl MockConfig {
        fn new(images_dir: &Path) -> Self {
            Self {
                images_dir: images_dir.to_path_buf(),
                output_html: images_dir.join("out").join("map.html"),
                allowed_exts: default_allowed_exts(),
                limit: 0,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn images_dir(&self) -> &Path {
            &self.images_dir
        }

        fn output_html(&self) -> &Path {
            &self.output_html
        }

        fn recurse(&self) -> bool {
            true
        }

        fn allowed_exts(&self) -> &[String] {
            &self.allowed_exts
        }

        fn limit(&self) -> usize {
            self.limit
        }

        fn map_options(&self) -> MapOptions {
            MapOptions::default()
        }

        fn thumbnail_options(&self) -> ThumbnailOptions {
            ThumbnailOptions {
                workers: 2,
                ..ThumbnailOptions::default()
            }
        }

        fn monitoring_enabled(&self) -> bool {
            false
        }
    }

    fn photo_with_sidecar(dir: &Path, name: &str, lat: f64, lon: f64) {
        image::RgbImage::new(64, 48).save(dir.join(name)).unwrap();
        std::fs::write(
            dir.join(format!("{}.json", name)),
            format!(
                r#"{{"geoData": {{"latitude": {}, "longitude": {}}},
                    "photoTakenTime": {{"formatted": "Jul 14, 2019"}}}}"#,
                lat, lon
            ),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_extract_missing_images_dir() {
        let dir = TempDir::new().unwrap();
        let config = MockConfig::new(&dir.path().join("nope"));
        let pipeline = PhotoPipeline::new(MockStorage::new(), config);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, PhotoMapError::ImagesDirNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_extract_respects_limit_and_extensions() {
        let dir = TempDir::new().unwrap();
        photo_with_sidecar(dir.path(), "a.png", 48.85, 2.35);
        photo_with_sidecar(dir.path(), "b.png", 35.68, 139.69);
        std::fs::write(dir.path().join("notes.txt"), "not a photo").unwrap();

        let mut config = MockConfig::new(dir.path());
        config.limit = 1;
        let pipeline = PhotoPipeline::new(MockStorage::new(), config);

        let photos = pipeline.extract().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].path, dir.path().join("a.png"));
        assert_eq!(photos[0].coordinates(), Some((48.85, 2.35)));
    }

    #[test]
    fn test_reader_panic_keeps_photo_without_gps() {
        fn read(path: &Path) -> PhotoMeta {
            if path.ends_with("bad.jpg") {
                panic!("malformed IFD");
            }
            PhotoMeta::new(path).with_coordinates(1.0, 2.0)
        }

        let paths = vec![PathBuf::from("img/bad.jpg"), PathBuf::from("img/good.jpg")];
        let photos = read_all(&paths, read);

        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].path, PathBuf::from("img/bad.jpg"));
        assert!(!photos[0].has_gps());
        assert_eq!(photos[1].coordinates(), Some((1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_full_run_writes_all_artifacts() {
        let dir = TempDir::new().unwrap();
        photo_with_sidecar(dir.path(), "paris.png", 48.85, 2.35);
        image::RgbImage::new(8, 8)
            .save(dir.path().join("nogps.png"))
            .unwrap();

        let storage = MockStorage::new();
        let pipeline = PhotoPipeline::new(storage.clone(), MockConfig::new(dir.path()));

        let photos = pipeline.extract().await.unwrap();
        let artifacts = pipeline.transform(photos).await.unwrap();
        assert_eq!(artifacts.stats.scanned, 2);
        assert_eq!(artifacts.stats.with_gps, 1);
        assert_eq!(artifacts.thumbnails.len(), 1);

        let report = pipeline.load(artifacts).await.unwrap();
        assert_eq!(report.files_written, 5);
        assert_eq!(report.output_dir, dir.path().join("out"));

        let geojson: serde_json::Value =
            serde_json::from_slice(&storage.get_file(GEOJSON_FILE).await.unwrap()).unwrap();
        let feature = &geojson["features"][0];
        assert_eq!(geojson["features"].as_array().unwrap().len(), 1);
        assert_eq!(feature["properties"]["path"], "paris.png");
        assert_eq!(feature["properties"]["img_rel"], "../paris.png");
        let thumb = feature["properties"]["thumb"].as_str().unwrap();
        assert!(storage.get_file(thumb).await.is_some());

        let skipped = String::from_utf8(storage.get_file(SKIPPED_FILE).await.unwrap()).unwrap();
        assert_eq!(skipped, dir.path().join("nogps.png").to_string_lossy());

        let csv = String::from_utf8(storage.get_file(CSV_FILE).await.unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 3);

        let html = String::from_utf8(storage.get_file("map.html").await.unwrap()).unwrap();
        assert!(html.contains("window.__PHOTO_FEATURES__"));
        assert!(html.contains("paris.png"));
    }

    #[tokio::test]
    async fn test_existing_thumbnail_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        photo_with_sidecar(dir.path(), "paris.png", 48.85, 2.35);

        let storage = MockStorage::new();
        let rel = crate::thumbnails::thumbnail_rel_path(&dir.path().join("paris.png"));
        storage.write_file(&rel, b"cached").await.unwrap();

        let pipeline = PhotoPipeline::new(storage.clone(), MockConfig::new(dir.path()));
        let photos = pipeline.extract().await.unwrap();
        let artifacts = pipeline.transform(photos).await.unwrap();
        assert!(artifacts.thumbnails.is_empty());

        pipeline.load(artifacts).await.unwrap();
        assert_eq!(storage.get_file(&rel).await.unwrap(), b"cached".to_vec());
    }
}
