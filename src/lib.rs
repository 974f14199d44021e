pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod map;
pub mod report;
pub mod thumbnails;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use core::{DemoPipeline, PhotoMapEngine, PhotoPipeline};
pub use domain::model::{PhotoMeta, RunReport, ScanStats};
pub use map::{MapBuilder, MapOptions};
pub use utils::error::{PhotoMapError, Result};
