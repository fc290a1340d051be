pub mod etl;
pub mod kmeans;
pub mod labeling;
pub mod pipeline;
pub mod segmentation;

pub use crate::domain::model::{CustomerRecord, ExportDocument, GroupResult, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
