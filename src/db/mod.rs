pub mod postgres;

pub use postgres::PostgresStore;

use crate::models::{FlowRecord, ListedAsset};
use crate::Result;
use async_trait::async_trait;

/// Storage for the coin listing
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert, or overwrite name/symbol/market cap of the row with the same `token_id`
    async fn upsert_asset(&self, asset: &ListedAsset) -> Result<()>;

    /// Every known token id
    async fn asset_ids(&self) -> Result<Vec<i64>>;
}

/// Storage for fund-flow time series
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Insert, or overwrite the row with the same `(symbol, time)`
    async fn upsert_flow_record(&self, record: &FlowRecord) -> Result<()>;
}
