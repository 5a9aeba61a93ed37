use crate::domain::model::{
    BuildReport, Composition, Price, PriceSnapshot, PriceStatus, SiteSources,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Relative paths of every file below `dir`, sorted. Missing directory yields nothing.
    fn list_files(&self, dir: &str)
        -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
    /// Removes everything below the storage root.
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn src_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn pages_dir(&self) -> &str;
    fn includes_dir(&self) -> &str;
    fn asset_dirs(&self) -> &[String];
    fn asset_files(&self) -> &[String];
    fn globals(&self) -> &BTreeMap<String, String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SiteSources>;
    async fn transform(&self, sources: SiteSources) -> Result<Composition>;
    async fn load(&self, composition: Composition) -> Result<BuildReport>;
}

/// An external quote endpoint plus the rule that pulls a EUR price out of its response.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_price(&self, client: &reqwest::Client) -> Result<Price>;
}

pub trait PriceObserver: Send + Sync {
    fn on_price(&self, snapshot: &PriceSnapshot);

    fn on_status(&self, _status: &PriceStatus) {}
}
