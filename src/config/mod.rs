pub mod basemaps;
#[cfg(feature = "cli")]
pub mod cli;
pub mod local_storage;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use local_storage::LocalStorage;
pub use toml_config::TomlConfig;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PhotoMapError, Result};
use crate::utils::validation::{
    validate_extension_list, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_tile_url,
};
use std::path::{Path, PathBuf};

pub const DEFAULT_IMAGES_DIR: &str = "./img";
pub const DEFAULT_OUTPUT_HTML: &str = "./output/map.html";
pub const DEFAULT_ALLOWED_EXTS: [&str; 5] = [".jpg", ".jpeg", ".png", ".heic", ".heif"];

pub fn default_allowed_exts() -> Vec<String> {
    DEFAULT_ALLOWED_EXTS.iter().map(|e| e.to_string()).collect()
}

/// Directory the artifacts are written to: the parent of the HTML file.
pub fn output_dir_for(output_html: &Path) -> PathBuf {
    match output_html.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_path("scan.images", &config.images_dir().to_string_lossy())?;
    validate_path("output.html", &config.output_html().to_string_lossy())?;
    if config.output_html().file_name().is_none() {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: "output.html".to_string(),
            value: config.output_html().display().to_string(),
            reason: "Output must name an HTML file, not a directory".to_string(),
        });
    }
    validate_extension_list("scan.allowed_exts", config.allowed_exts())?;

    let map = config.map_options();
    validate_positive_number("markers.point_radius", map.point_radius as usize, 1)?;
    validate_range("map.default_zoom_start", map.default_zoom_start, 0, 22)?;
    validate_range("heatmap.min_opacity", map.heat.min_opacity, 0.0, 1.0)?;
    validate_positive_number("heatmap.radius", map.heat.radius as usize, 1)?;
    validate_range("heatmap.max_zoom", map.heat.max_zoom, 0, 22)?;

    validate_non_empty_string("map.default_basemap", &map.default_basemap)?;
    for basemap in &map.basemaps {
        validate_non_empty_string("basemaps.name", &basemap.name)?;
        validate_tile_url("basemaps.url", &basemap.url)?;
        if let Some(max_zoom) = basemap.max_zoom {
            validate_range("basemaps.max_zoom", max_zoom, 0, 22)?;
        }
    }
    if !map.basemaps.iter().any(|b| b.name == map.default_basemap) {
        return Err(PhotoMapError::ConfigValidationError {
            field: "map.default_basemap".to_string(),
            message: format!(
                "'{}' is not one of the configured basemaps",
                map.default_basemap
            ),
        });
    }

    let thumbs = config.thumbnail_options();
    validate_range("thumbnails.size", thumbs.size, 16, 4096)?;
    validate_range("thumbnails.quality", thumbs.quality, 1, 100)?;
    validate_positive_number("thumbnails.workers", thumbs.workers, 1)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_for() {
        assert_eq!(
            output_dir_for(Path::new("./output/map.html")),
            PathBuf::from("./output")
        );
        assert_eq!(output_dir_for(Path::new("map.html")), PathBuf::from("."));
    }
}
