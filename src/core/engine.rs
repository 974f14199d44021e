use crate::domain::model::RunReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::{Phase, SystemMonitor};

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct PhotoMapEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> PhotoMapEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started = chrono::Local::now();
        tracing::info!("Starting photo map run at {}", started.format("%Y-%m-%d %H:%M:%S"));

        tracing::info!("Extracting photo metadata...");
        let photos = self.pipeline.extract().await?;
        tracing::info!("Extracted {} photos", photos.len());
        self.monitor.phase_done(Phase::Extract, photos.len());

        tracing::info!("Building map artifacts...");
        let artifacts = self.pipeline.transform(photos).await?;
        tracing::info!(
            "Prepared {} files ({} located, {} without GPS)",
            artifacts.file_count(),
            artifacts.stats.with_gps,
            artifacts.stats.without_gps
        );
        self.monitor.phase_done(Phase::Transform, artifacts.file_count());

        tracing::info!("Writing output...");
        let report = self.pipeline.load(artifacts).await?;
        tracing::info!(
            "Wrote {} files to {}",
            report.files_written,
            report.output_dir.display()
        );
        self.monitor.phase_done(Phase::Load, report.files_written);

        let elapsed = chrono::Local::now() - started;
        tracing::info!("Run finished in {} ms", elapsed.num_milliseconds());
        self.monitor.log_final_stats(&report.stats);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{MapArtifacts, PhotoMeta, ScanStats};
    use crate::utils::error::PhotoMapError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    impl MockPipeline {
        fn new(fail_transform: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_transform,
            }
        }
    }

    #[async_trait]
    impl Pipeline for MockPipeline {
        async fn extract(&self) -> Result<Vec<PhotoMeta>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                PhotoMeta::new("img/a.jpg").with_coordinates(1.0, 2.0),
                PhotoMeta::new("img/b.jpg"),
            ])
        }

        async fn transform(&self, photos: Vec<PhotoMeta>) -> Result<MapArtifacts> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(PhotoMapError::processing("boom"));
            }
            let with_gps = photos.iter().filter(|p| p.has_gps()).count();
            Ok(MapArtifacts {
                stats: ScanStats {
                    scanned: photos.len(),
                    with_gps,
                    without_gps: photos.len() - with_gps,
                },
                html_file_name: "map.html".to_string(),
                html: "<html></html>".to_string(),
                geojson: "{}".to_string(),
                csv: None,
                skipped: None,
                thumbnails: Vec::new(),
                demo: false,
            })
        }

        async fn load(&self, artifacts: MapArtifacts) -> Result<RunReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RunReport {
                html_path: PathBuf::from("out/map.html"),
                output_dir: PathBuf::from("out"),
                stats: artifacts.stats,
                demo: artifacts.demo,
                files_written: artifacts.file_count(),
            })
        }
    }

    #[tokio::test]
    async fn test_run_passes_through_all_phases() {
        let engine = PhotoMapEngine::new(MockPipeline::new(false));
        let report = engine.run().await.unwrap();

        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.stats.scanned, 2);
        assert_eq!(report.stats.with_gps, 1);
        assert_eq!(report.files_written, 2);
    }

    #[tokio::test]
    async fn test_run_stops_at_failing_phase() {
        let engine = PhotoMapEngine::new_with_monitoring(MockPipeline::new(true), true);
        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, PhotoMapError::ProcessingError { .. }));
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 2);
    }
}
