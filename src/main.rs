use clap::Parser;
use photomap::config::output_dir_for;
use photomap::domain::ports::{ConfigProvider, Pipeline};
use photomap::utils::{logger, validation::Validate};
use photomap::{CliConfig, DemoPipeline, LocalStorage, PhotoMapEngine, PhotoPipeline, RunReport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting photomap CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(output_dir_for(config.output_html()));
    let result = if config.demo {
        let pipeline = DemoPipeline::new(storage, config.out.clone(), config.map_options())
            .with_seed(config.demo_seed);
        run(pipeline, monitor_enabled).await
    } else {
        run(PhotoPipeline::new(storage, config), monitor_enabled).await
    };

    match result {
        Ok(report) => print_summary(&report),
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run<P: Pipeline>(pipeline: P, monitor_enabled: bool) -> photomap::Result<RunReport> {
    PhotoMapEngine::new_with_monitoring(pipeline, monitor_enabled)
        .run()
        .await
}

fn print_summary(report: &RunReport) {
    if report.demo {
        println!("Demo map written to {}", report.html_path.display());
        return;
    }

    println!(
        "Scanned: {}, With GPS: {}, Without GPS: {}",
        report.stats.scanned, report.stats.with_gps, report.stats.without_gps
    );
    println!("Map written to {}", report.html_path.display());
    println!("CSV/GeoJSON written to {}", report.output_dir.display());
    println!("Skipped list at {}", report.skipped_list_path().display());
}
