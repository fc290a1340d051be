use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub segmentation: Option<SegmentationConfig>,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    pub clusters: Option<usize>,
    pub seed: Option<u64>,
    pub n_init: Option<usize>,
    pub max_iterations: Option<usize>,
    pub standardize: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_file: String,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` occurrences with environment values; unknown
    /// variables are left as-is so validation can flag them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("source.input_dir", &self.source.input_dir)?;
        validate_path("load.output_file", &self.load.output_file)?;

        if let Some(segmentation) = &self.segmentation {
            if let Some(clusters) = segmentation.clusters {
                validate_positive_number("segmentation.clusters", clusters, 1)?;
            }
            if let Some(n_init) = segmentation.n_init {
                validate_positive_number("segmentation.n_init", n_init, 1)?;
            }
            if let Some(max_iterations) = segmentation.max_iterations {
                validate_positive_number("segmentation.max_iterations", max_iterations, 1)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &str {
        &self.source.input_dir
    }

    fn output_file(&self) -> &str {
        &self.load.output_file
    }

    fn clusters(&self) -> usize {
        self.segmentation
            .as_ref()
            .and_then(|s| s.clusters)
            .unwrap_or(5)
    }

    fn seed(&self) -> u64 {
        self.segmentation
            .as_ref()
            .and_then(|s| s.seed)
            .unwrap_or(42)
    }

    fn n_init(&self) -> usize {
        self.segmentation
            .as_ref()
            .and_then(|s| s.n_init)
            .unwrap_or(10)
    }

    fn max_iterations(&self) -> usize {
        self.segmentation
            .as_ref()
            .and_then(|s| s.max_iterations)
            .unwrap_or(300)
    }

    fn standardize(&self) -> bool {
        self.segmentation
            .as_ref()
            .and_then(|s| s.standardize)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
