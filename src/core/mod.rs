pub mod demo_pipeline;
pub mod engine;
pub mod photo_pipeline;

pub use crate::domain::model::{MapArtifacts, PhotoMeta, RunReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use demo_pipeline::DemoPipeline;
pub use engine::PhotoMapEngine;
pub use photo_pipeline::PhotoPipeline;
