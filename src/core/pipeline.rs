use crate::core::segmentation::{segment, SegmentationParams};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    CustomerRecord, ExportDocument, GroupFailure, MallDocument, TransformResult,
};
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// The batch segmentation pipeline: read per-mall files, segment each
/// (mall, year) group independently, write one consolidated export.
pub struct SegmentationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SegmentationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn params(&self) -> SegmentationParams {
        SegmentationParams {
            clusters: self.config.clusters(),
            seed: self.config.seed(),
            n_init: self.config.n_init(),
            max_iterations: self.config.max_iterations(),
            standardize: self.config.standardize(),
        }
    }
}

/// `Metro_Plaza.json` -> `Metro Plaza`.
fn mall_name_from_filename(filename: &str) -> String {
    filename.trim_end_matches(".json").replace('_', " ")
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SegmentationPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<MallDocument>> {
        let input_dir = self.config.input_dir();
        let filenames = self.storage.list_files(input_dir, "json").await?;
        tracing::debug!("Found {} mall files in {}", filenames.len(), input_dir);

        let mut documents = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let path = Path::new(input_dir).join(&filename);
            let bytes = self.storage.read_file(&path.to_string_lossy()).await?;
            let years: BTreeMap<String, Vec<serde_json::Value>> =
                serde_json::from_slice(&bytes)?;

            documents.push(MallDocument {
                mall: mall_name_from_filename(&filename),
                years,
            });
        }

        Ok(documents)
    }

    async fn transform(&self, data: Vec<MallDocument>) -> Result<TransformResult> {
        let params = self.params();
        let mut export: ExportDocument = BTreeMap::new();
        let mut failures = Vec::new();
        let mut total_groups = 0usize;

        for document in data {
            for (year, raw_customers) in document.years {
                total_groups += 1;

                let outcome = raw_customers
                    .iter()
                    .map(CustomerRecord::from_value)
                    .collect::<Result<Vec<_>>>()
                    .and_then(|records| segment(&records, &params));

                match outcome {
                    Ok(result) => {
                        tracing::debug!(
                            "Segmented {} / {}: {} visitors",
                            document.mall,
                            year,
                            result.stats.total_visitors
                        );
                        export
                            .entry(document.mall.clone())
                            .or_default()
                            .insert(year, result);
                    }
                    Err(e) => {
                        // One bad group never aborts its siblings; it is
                        // reported and left out of the export.
                        tracing::warn!(
                            "Skipping group {} / {}: {}",
                            document.mall,
                            year,
                            e
                        );
                        failures.push(GroupFailure {
                            mall: document.mall.clone(),
                            year,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        if export.is_empty() {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "no group produced a segmentation ({} groups found, {} failed)",
                    total_groups,
                    failures.len()
                ),
            });
        }

        Ok(TransformResult { export, failures })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_file = self.config.output_file();
        let bytes = serde_json::to_vec_pretty(&result.export)?;
        self.storage.write_file(output_file, &bytes).await?;
        Ok(output_file.to_string())
    }
}
