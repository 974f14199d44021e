use crate::config::{default_allowed_exts, validate_provider};
use crate::domain::ports::ConfigProvider;
use crate::map::MapOptions;
use crate::thumbnails::ThumbnailOptions;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "photomap")]
#[command(about = "Photo map with viewport gallery")]
pub struct CliConfig {
    /// Folder containing photos
    #[arg(long, default_value = crate::config::DEFAULT_IMAGES_DIR)]
    pub images: PathBuf,

    /// Output HTML path; reports and thumbnails go next to it
    #[arg(long, default_value = crate::config::DEFAULT_OUTPUT_HTML)]
    pub out: PathBuf,

    /// Circle marker radius
    #[arg(long, default_value = "6")]
    pub point_radius: u32,

    /// Enable clustering (default)
    #[arg(long, overrides_with = "no_cluster")]
    pub cluster: bool,

    /// Disable clustering
    #[arg(long)]
    pub no_cluster: bool,

    /// Include heatmap layer (default)
    #[arg(long, overrides_with = "no_include_heat")]
    pub include_heat: bool,

    /// Exclude heatmap layer
    #[arg(long)]
    pub no_include_heat: bool,

    /// Limit photos processed (0 = no limit)
    #[arg(long, default_value = "0")]
    pub limit: usize,

    /// Thumbnail bounding box in pixels
    #[arg(long, default_value = "256")]
    pub thumb_size: u32,

    /// Concurrent thumbnail workers
    #[arg(long, default_value = "4")]
    pub workers: usize,

    /// Generate a map with synthetic points (no photos)
    #[arg(long)]
    pub demo: bool,

    /// Seed for --demo; defaults to the current time
    #[arg(long)]
    pub demo_seed: Option<u64>,

    /// Enable verbose output
    #[arg(long, help = "Verbose logging")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Log per-phase throughput and memory usage
    #[arg(long)]
    pub monitor: bool,

    #[arg(skip = default_allowed_exts())]
    #[serde(default = "default_allowed_exts")]
    pub allowed_exts: Vec<String>,
}

impl CliConfig {
    pub fn cluster_enabled(&self) -> bool {
        !self.no_cluster
    }

    pub fn heat_enabled(&self) -> bool {
        !self.no_include_heat
    }
}

impl ConfigProvider for CliConfig {
    fn images_dir(&self) -> &Path {
        &self.images
    }

    fn output_html(&self) -> &Path {
        &self.out
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
        MapOptions {
            point_radius: self.point_radius,
            cluster: self.cluster_enabled(),
            include_heat: self.heat_enabled(),
            ..MapOptions::default()
        }
    }

    fn thumbnail_options(&self) -> ThumbnailOptions {
        ThumbnailOptions {
            size: self.thumb_size,
            workers: self.workers,
            ..ThumbnailOptions::default()
        }
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["photomap"]);
        assert_eq!(config.images, PathBuf::from("./img"));
        assert_eq!(config.out, PathBuf::from("./output/map.html"));
        assert_eq!(config.point_radius, 6);
        assert!(config.cluster_enabled());
        assert!(config.heat_enabled());
        assert_eq!(config.limit, 0);
        assert_eq!(config.allowed_exts.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_flags() {
        let config = CliConfig::parse_from(["photomap", "--no-cluster", "--no-include-heat"]);
        assert!(!config.cluster_enabled());
        assert!(!config.heat_enabled());

        let options = config.map_options();
        assert!(!options.cluster);
        assert!(!options.include_heat);
    }

    #[test]
    fn test_last_flag_wins() {
        let config = CliConfig::parse_from(["photomap", "--no-cluster", "--cluster"]);
        assert!(config.cluster_enabled());
    }

    #[test]
    fn test_invalid_radius_fails_validation() {
        let config = CliConfig::parse_from(["photomap", "--point-radius", "0"]);
        assert!(config.validate().is_err());
    }
}
