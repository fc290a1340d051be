pub mod config;
pub mod core;
pub mod domain;
pub mod generator;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, CliConfig};
pub use core::{etl::EtlEngine, pipeline::SegmentationPipeline};
pub use utils::error::{EtlError, Result};
