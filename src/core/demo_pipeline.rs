use crate::config::output_dir_for;
use crate::domain::model::{MapArtifacts, PhotoMeta, RunReport, ScanStats};
use crate::domain::ports::{Pipeline, Storage};
use crate::domain::GEOJSON_FILE;
use crate::map::{MapBuilder, MapOptions};
use crate::report::{Feature, FeatureCollection};
use crate::utils::error::Result;
use serde_json::{Map, Value};
use std::path::PathBuf;

pub const DEMO_POINT_COUNT: usize = 1000;

/// Half-width, in degrees, of the square each synthetic point is drawn from.
pub const DEMO_SPREAD_DEG: f64 = 1.5;

/// Paris, New York, Los Angeles, Tokyo.
pub const DEMO_CLUSTERS: [(f64, f64); 4] = [
    (48.85, 2.35),
    (40.71, -74.01),
    (34.05, -118.24),
    (35.68, 139.69),
];

/// xorshift64 generator; the same seed always yields the same demo map.
#[derive(Debug, Clone)]
pub struct GeoRng {
    state: u64,
}

impl GeoRng {
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Seed taken from the wall clock.
    pub fn from_clock() -> Self {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::new(nanos as u64)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_u64() % items.len() as u64) as usize;
        items.get(index)
    }
}

pub fn demo_photo_name(index: usize) -> String {
    format!("demo/photo_{:05}.jpg", index)
}

/// Generates `count` points scattered around [`DEMO_CLUSTERS`].
pub fn demo_points(rng: &mut GeoRng, count: usize) -> Vec<(f64, f64)> {
    (0..count)
        .filter_map(|_| {
            let &(lat, lon) = rng.pick(&DEMO_CLUSTERS)?;
            Some((
                lat + rng.range_f64(-DEMO_SPREAD_DEG, DEMO_SPREAD_DEG),
                lon + rng.range_f64(-DEMO_SPREAD_DEG, DEMO_SPREAD_DEG),
            ))
        })
        .collect()
}

fn demo_feature(meta: &PhotoMeta, lat: f64, lon: f64) -> Feature {
    let mut props = Map::new();
    props.insert(
        "path".to_string(),
        Value::String(meta.path.to_string_lossy().into_owned()),
    );
    for key in ["datetime", "make", "model", "thumb", "img_rel"] {
        props.insert(key.to_string(), Value::Null);
    }
    Feature::point(lat, lon, props)
}

/// Synthetic map around a few world cities, for trying the page without photos.
/// Only the GeoJSON and the HTML are written.
pub struct DemoPipeline<S: Storage> {
    storage: S,
    output_html: PathBuf,
    map_options: MapOptions,
    seed: Option<u64>,
    count: usize,
}

impl<S: Storage> DemoPipeline<S> {
    pub fn new(storage: S, output_html: impl Into<PathBuf>, map_options: MapOptions) -> Self {
        Self {
            storage,
            output_html: output_html.into(),
            map_options,
            seed: None,
            count: DEMO_POINT_COUNT,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    fn rng(&self) -> GeoRng {
        match self.seed {
            Some(seed) => GeoRng::new(seed),
            None => GeoRng::from_clock(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for DemoPipeline<S> {
    async fn extract(&self) -> Result<Vec<PhotoMeta>> {
        let mut rng = self.rng();
        let photos = demo_points(&mut rng, self.count)
            .into_iter()
            .enumerate()
            .map(|(i, (lat, lon))| PhotoMeta::new(demo_photo_name(i + 1)).with_coordinates(lat, lon))
            .collect();
        Ok(photos)
    }

    async fn transform(&self, photos: Vec<PhotoMeta>) -> Result<MapArtifacts> {
        let points: Vec<(f64, f64)> = photos.iter().filter_map(PhotoMeta::coordinates).collect();
        let features = FeatureCollection::new(
            photos
                .iter()
                .filter_map(|meta| {
                    let (lat, lon) = meta.coordinates()?;
                    Some(demo_feature(meta, lat, lon))
                })
                .collect(),
        );

        let html = MapBuilder::new(self.map_options.clone()).build(&points, &features)?;
        let html_file_name = self
            .output_html
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "map.html".to_string());

        Ok(MapArtifacts {
            stats: ScanStats {
                scanned: photos.len(),
                with_gps: points.len(),
                without_gps: photos.len() - points.len(),
            },
            html_file_name,
            html,
            geojson: serde_json::to_string(&features)?,
            csv: None,
            skipped: None,
            thumbnails: Vec::new(),
            demo: true,
        })
    }

    async fn load(&self, artifacts: MapArtifacts) -> Result<RunReport> {
        let files_written = artifacts.file_count();
        self.storage
            .write_file(GEOJSON_FILE, artifacts.geojson.as_bytes())
            .await?;
        self.storage
            .write_file(&artifacts.html_file_name, artifacts.html.as_bytes())
            .await?;

        Ok(RunReport {
            html_path: self.output_html.clone(),
            output_dir: output_dir_for(&self.output_html),
            stats: artifacts.stats,
            demo: true,
            files_written,
        })
    }
}
