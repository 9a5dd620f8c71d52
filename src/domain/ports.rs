use crate::core::normalize::SourceDialect;
use crate::domain::geo::Basemap;
use crate::domain::model::{FilterState, RawRecord, Role};
use crate::domain::params::{AggregationParams, MarketWorthParams};
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
    fn api_endpoint(&self) -> &str;
    fn basemap_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn dialect(&self) -> SourceDialect;
    fn filters(&self) -> &FilterState;
    fn drift_role(&self) -> Option<Role>;
    fn aggregation(&self) -> &AggregationParams;
    fn market_worth(&self) -> &MarketWorthParams;
}

/// Where the raw postings come from.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_jobs(&self) -> Result<Vec<RawRecord>>;
}

#[async_trait]
pub trait BasemapSource: Send + Sync {
    async fn fetch_basemap(&self) -> Result<Basemap>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Loaded: Send;

    async fn extract(&self) -> Result<Vec<RawRecord>>;
    async fn transform(&self, data: Vec<RawRecord>) -> Result<Self::Loaded>;
    async fn load(&self, loaded: Self::Loaded) -> Result<String>;
}
