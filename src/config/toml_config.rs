use crate::config::basemaps::{default_basemaps, Basemap, DEFAULT_BASEMAP};
use crate::config::{default_allowed_exts, validate_provider, DEFAULT_IMAGES_DIR, DEFAULT_OUTPUT_HTML};
use crate::domain::ports::ConfigProvider;
use crate::map::{HeatmapOptions, MapOptions};
use crate::thumbnails::ThumbnailOptions;
use crate::utils::error::{PhotoMapError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File-based configuration. Every section is optional and falls back to the CLI defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub scan: ScanConfig,
    pub output: OutputConfig,
    pub map: MapConfig,
    pub heatmap: HeatmapConfig,
    pub markers: MarkerConfig,
    pub thumbnails: ThumbnailConfig,
    pub monitoring: Option<MonitoringConfig>,
    pub basemaps: Option<Vec<Basemap>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub images: PathBuf,
    pub recurse: bool,
    pub allowed_exts: Vec<String>,
    pub limit: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            images: PathBuf::from(DEFAULT_IMAGES_DIR),
            recurse: true,
            allowed_exts: default_allowed_exts(),
            limit: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub html: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html: PathBuf::from(DEFAULT_OUTPUT_HTML),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_zoom_start: u8,
    pub default_basemap: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_zoom_start: 2,
            default_basemap: DEFAULT_BASEMAP.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub enabled: bool,
    pub min_opacity: f64,
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u8,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        let heat = HeatmapOptions::default();
        Self {
            enabled: true,
            min_opacity: heat.min_opacity,
            radius: heat.radius,
            blur: heat.blur,
            max_zoom: heat.max_zoom,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub point_radius: u32,
    pub cluster: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            point_radius: 6,
            cluster: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub size: u32,
    pub quality: u8,
    pub workers: usize,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        let defaults = ThumbnailOptions::default();
        Self {
            size: defaults.size,
            quality: defaults.quality,
            workers: defaults.workers,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PhotoMapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${NAME}` with the environment variable; unset variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PhotoMapError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn basemaps(&self) -> Vec<Basemap> {
        self.basemaps.clone().unwrap_or_else(default_basemaps)
    }

    /// Command-line override for `[monitoring] enabled`.
    pub fn set_monitoring(&mut self, enabled: bool) {
        match self.monitoring.as_mut() {
            Some(monitoring) => monitoring.enabled = enabled,
            None => {
                self.monitoring = Some(MonitoringConfig {
                    enabled,
                    log_level: None,
                })
            }
        }
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref()?.log_level.as_deref()
    }
}

impl ConfigProvider for TomlConfig {
    fn images_dir(&self) -> &Path {
        &self.scan.images
    }

    fn output_html(&self) -> &Path {
        &self.output.html
    }

    fn recurse(&self) -> bool {
        self.scan.recurse
    }

    fn allowed_exts(&self) -> &[String] {
        &self.scan.allowed_exts
    }

    fn limit(&self) -> usize {
        self.scan.limit
    }

    fn map_options(&self) -> MapOptions {
        MapOptions {
            default_zoom_start: self.map.default_zoom_start,
            include_heat: self.heatmap.enabled,
            heat: HeatmapOptions {
                min_opacity: self.heatmap.min_opacity,
                radius: self.heatmap.radius,
                blur: self.heatmap.blur,
                max_zoom: self.heatmap.max_zoom,
            },
            cluster: self.markers.cluster,
            point_radius: self.markers.point_radius,
            basemaps: self.basemaps(),
            default_basemap: self.map.default_basemap.clone(),
        }
    }

    fn thumbnail_options(&self) -> ThumbnailOptions {
        ThumbnailOptions {
            size: self.thumbnails.size,
            quality: self.thumbnails.quality,
            workers: self.thumbnails.workers,
        }
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if self.basemaps.as_ref().is_some_and(Vec::is_empty) {
            return Err(PhotoMapError::MissingConfigError {
                field: "basemaps".to_string(),
            });
        }
        validate_provider(self)
    }
}
