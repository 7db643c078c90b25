use crate::domain::model::SheetSet;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn leads_endpoint(&self) -> &str;
    fn test_drives_endpoint(&self) -> &str;
    fn journeys_endpoint(&self) -> &str;
    fn billed_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
}

/// An ingestion path: produces the five positional sheets from some source.
#[async_trait]
pub trait Ingestor: Send + Sync {
    async fn extract(&self) -> Result<SheetSet>;
}
