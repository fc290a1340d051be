use crate::domain::model::{MallDocument, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn list_files(
        &self,
        dir: &str,
        extension: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn output_file(&self) -> &str;
    fn clusters(&self) -> usize;
    fn seed(&self) -> u64;
    fn n_init(&self) -> usize;
    fn max_iterations(&self) -> usize;
    fn standardize(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MallDocument>>;
    async fn transform(&self, data: Vec<MallDocument>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
