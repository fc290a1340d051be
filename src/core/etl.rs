use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Extracting mall data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} mall documents", raw_data.len());

        tracing::info!("Segmenting customer groups...");
        let transformed = self.pipeline.transform(raw_data).await?;
        let group_count: usize = transformed.export.values().map(|years| years.len()).sum();
        tracing::info!(
            "Segmented {} groups ({} failed)",
            group_count,
            transformed.failures.len()
        );

        tracing::info!("Writing dashboard export...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
