use clap::Parser;
use mall_segment::core::ConfigProvider;
use mall_segment::utils::{logger, validation::Validate};
use mall_segment::{CliConfig, EtlEngine, LocalStorage, Result, SegmentationPipeline, TomlConfig};

async fn run_pipeline<C: ConfigProvider + 'static>(config: C) -> Result<String> {
    let storage = LocalStorage::new(".".to_string());
    let pipeline = SegmentationPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);
    engine.run().await
}

async fn run(cli: CliConfig) -> Result<String> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading pipeline configuration from {}", path);
            let config = TomlConfig::from_file(path)?;
            config.validate()?;
            run_pipeline(config).await
        }
        None => {
            cli.validate()?;
            run_pipeline(cli).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting mall-segment pipeline");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(cli).await {
        Ok(output_path) => {
            tracing::info!("Segmentation pipeline completed successfully");
            println!("✅ Segmentation complete! Dashboard data saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "Segmentation pipeline failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
