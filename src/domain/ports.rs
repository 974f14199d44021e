use crate::domain::model::{MapArtifacts, PhotoMeta, RunReport};
use crate::map::MapOptions;
use crate::thumbnails::ThumbnailOptions;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn images_dir(&self) -> &Path;
    fn output_html(&self) -> &Path;
    fn recurse(&self) -> bool;
    fn allowed_exts(&self) -> &[String];
    /// 0 means unlimited.
    fn limit(&self) -> usize;
    fn map_options(&self) -> MapOptions;
    fn thumbnail_options(&self) -> ThumbnailOptions;
    fn monitoring_enabled(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PhotoMeta>>;
    async fn transform(&self, photos: Vec<PhotoMeta>) -> Result<MapArtifacts>;
    async fn load(&self, artifacts: MapArtifacts) -> Result<RunReport>;
}
