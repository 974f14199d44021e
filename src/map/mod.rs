pub mod assets;
pub mod builder;

pub use builder::MapBuilder;

use crate::config::basemaps::{default_basemaps, Basemap, DEFAULT_BASEMAP};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapOptions {
    pub min_opacity: f64,
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u8,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            min_opacity: 0.55,
            radius: 16,
            blur: 10,
            max_zoom: 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub default_zoom_start: u8,
    pub include_heat: bool,
    pub heat: HeatmapOptions,
    pub cluster: bool,
    pub point_radius: u32,
    pub basemaps: Vec<Basemap>,
    /// Name of the basemap visible on load; must match one of `basemaps`.
    pub default_basemap: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            default_zoom_start: 2,
            include_heat: true,
            heat: HeatmapOptions::default(),
            cluster: true,
            point_radius: 6,
            basemaps: default_basemaps(),
            default_basemap: DEFAULT_BASEMAP.to_string(),
        }
    }
}
