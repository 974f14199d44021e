use clap::Parser;
use photomap::adapters::scan_images;
use photomap::config::{output_dir_for, TomlConfig};
use photomap::domain::ports::{ConfigProvider, Pipeline};
use photomap::utils::{logger, validation::Validate};
use photomap::{DemoPipeline, LocalStorage, PhotoMapEngine, PhotoPipeline, RunReport};

#[derive(Parser)]
#[command(name = "toml-photomap")]
#[command(about = "Photo map generator driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "photomap.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Generate a synthetic demo map instead of scanning photos
    #[arg(long)]
    demo: Option<bool>,

    /// Dry run - show what would be processed without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.log_level() == Some("debug");
    logger::init_cli_logger(verbose);

    tracing::info!("🚀 Starting TOML-based photomap");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(monitor) = args.monitor {
        config.set_monitoring(monitor);
        tracing::info!("🔧 Monitoring overridden to: {}", monitor);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    let demo = args.demo.unwrap_or(false);
    display_config_summary(&config, &args, demo);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        perform_dry_run(&config, demo).await?;
        return Ok(());
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(output_dir_for(config.output_html()));
    let result = if demo {
        let pipeline = DemoPipeline::new(
            storage,
            config.output_html().to_path_buf(),
            config.map_options(),
        );
        run(pipeline, monitor_enabled).await
    } else {
        run(PhotoPipeline::new(storage, config), monitor_enabled).await
    };

    match result {
        Ok(report) => {
            tracing::info!("✅ Photo map completed successfully!");
            if report.demo {
                println!("Demo map written to {}", report.html_path.display());
            } else {
                println!(
                    "Scanned: {}, With GPS: {}, Without GPS: {}",
                    report.stats.scanned, report.stats.with_gps, report.stats.without_gps
                );
                println!("Map written to {}", report.html_path.display());
                println!("CSV/GeoJSON written to {}", report.output_dir.display());
                println!("Skipped list at {}", report.skipped_list_path().display());
            }
        }
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

fn display_config_summary(config: &TomlConfig, args: &Args, demo: bool) {
    let map = config.map_options();
    let thumbs = config.thumbnail_options();

    println!("📋 Configuration Summary:");
    println!("  Images: {}", config.images_dir().display());
    println!("  Output: {}", config.output_html().display());
    println!("  Extensions: {}", config.allowed_exts().join(", "));
    println!("  Recurse: {}", config.recurse());
    if config.limit() > 0 {
        println!("  Limit: {}", config.limit());
    }
    println!("  Basemap: {} ({} available)", map.default_basemap, map.basemaps.len());
    println!("  Heatmap: {}", map.include_heat);
    println!("  Clustering: {}", map.cluster);
    println!(
        "  Thumbnails: {}px, quality {}, {} workers",
        thumbs.size, thumbs.quality, thumbs.workers
    );
    println!("  Demo Mode: {}", demo);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig, demo: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    if demo {
        println!(
            "  🎯 Demo Mode: {} synthetic points, no photos are read",
            photomap::core::demo_pipeline::DEMO_POINT_COUNT
        );
    } else {
        let images_dir = config.images_dir().to_path_buf();
        if !images_dir.is_dir() {
            println!("  ⚠️ Images directory not found: {}", images_dir.display());
        } else {
            let exts = config.allowed_exts().to_vec();
            let recurse = config.recurse();
            let limit = config.limit();
            let photos =
                tokio::task::spawn_blocking(move || scan_images(&images_dir, &exts, recurse, limit))
                    .await?;
            println!("📷 Matching photos: {}", photos.len());
        }
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Directory: {}", output_dir_for(config.output_html()).display());

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
