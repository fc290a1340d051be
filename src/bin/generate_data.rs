use clap::Parser;
use mall_segment::generator::{self, GeneratorConfig};
use mall_segment::utils::{logger, validation::Validate};
use mall_segment::LocalStorage;

#[tokio::main]
async fn main() {
    let config = GeneratorConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting synthetic data generation");

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    let storage = LocalStorage::new(".".to_string());

    match generator::generate(&config, &storage).await {
        Ok(files) => {
            tracing::info!("Generated {} mall files", files.len());
            println!("✅ Generation complete! Files saved in '{}'", config.output_dir);
        }
        Err(e) => {
            tracing::error!("Generation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
