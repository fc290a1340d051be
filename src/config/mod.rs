pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "mall-segment")]
#[command(about = "Segments mall customer records into labeled personas for the dashboard")]
pub struct CliConfig {
    /// Directory holding one JSON file per mall
    #[arg(long, default_value = "./mall_data")]
    pub input_dir: String,

    /// Consolidated dashboard export file
    #[arg(long, default_value = "./dashboard_data.json")]
    pub output_file: String,

    /// Number of clusters per (mall, year) group
    #[arg(long, default_value = "5")]
    pub clusters: usize,

    /// Seed for the k-means initialization
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of k-means restarts; the lowest-inertia fit wins
    #[arg(long, default_value = "10")]
    pub n_init: usize,

    /// Iteration cap per k-means run
    #[arg(long, default_value = "300")]
    pub max_iterations: usize,

    /// Z-score income and spending score before clustering
    #[arg(long)]
    pub standardize: bool,

    /// Optional TOML pipeline configuration; overrides the flags above
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn clusters(&self) -> usize {
        self.clusters
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn n_init(&self) -> usize {
        self.n_init
    }

    fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    fn standardize(&self) -> bool {
        self.standardize
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_dir", &self.input_dir)?;
        validate_path("output_file", &self.output_file)?;
        validate_positive_number("clusters", self.clusters, 1)?;
        validate_positive_number("n_init", self.n_init, 1)?;
        validate_positive_number("max_iterations", self.max_iterations, 1)?;
        Ok(())
    }
}
