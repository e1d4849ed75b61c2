use crate::api::{CoinClient, CoinEntry};
use crate::auth::AuthService;
use crate::db::ListingStore;
use crate::models::ListedAsset;
use crate::schedule::{Cadence, Scheduler};
use crate::{CycleStats, Outcome, Result};
use std::sync::Arc;

/// Listing refresh cadence: 00:00, 04:00, ... 20:00
pub const LISTING_CADENCE: Cadence = Cadence::hours(4);

/// Pulls the full coin listing and upserts it by token id
pub struct ListingIngestor {
    auth: AuthService,
    coins: CoinClient,
    store: Arc<dyn ListingStore>,
    max_pages: u32,
}

impl ListingIngestor {
    pub fn new(
        auth: AuthService,
        coins: CoinClient,
        store: Arc<dyn ListingStore>,
        max_pages: u32,
    ) -> Self {
        Self {
            auth,
            coins,
            store,
            max_pages,
        }
    }

    /// Run forever: wait, ingest, repeat
    pub async fn run(self, scheduler: Scheduler) {
        tracing::info!("Starting coin info task with 4-hour interval");

        for cycle in 0u64.. {
            scheduler.pace(LISTING_CADENCE, cycle).await;

            match self.run_cycle().await {
                Ok(stats) => stats.log_summary("coin_info"),
                Err(e) => tracing::error!(error = %e, "Coin info cycle abandoned"),
            }
        }
    }

    /// One cycle: fresh login, fetch every page, upsert each entry
    ///
    /// Returns `Err` without writing anything if login or any fetch fails.
    pub async fn run_cycle(&self) -> Result<CycleStats> {
        tracing::info!("Processing coin info task");

        let tokens = self.auth.login().await?;
        let entries = self
            .coins
            .query_all(&tokens.account_token, self.max_pages)
            .await?;

        tracing::info!(count = entries.len(), "Parsed coin data");

        Ok(self.save_entries(&entries).await)
    }

    /// Normalize and upsert entries one by one; bad entries are skipped
    pub async fn save_entries(&self, entries: &[CoinEntry]) -> CycleStats {
        let mut stats = CycleStats::begin(entries.len());

        for entry in entries {
            stats.tally(self.save_entry(entry).await);
        }

        stats.finish()
    }

    async fn save_entry(&self, entry: &CoinEntry) -> Outcome {
        let asset = match ListedAsset::try_from(entry) {
            Ok(asset) => asset,
            Err(e) => {
                tracing::warn!(symbol = %entry.symbol, error = %e, "Skipping coin entry");
                return Outcome::Skipped;
            }
        };

        match self.store.upsert_asset(&asset).await {
            Ok(()) => {
                tracing::debug!(
                    vs_token_id = asset.token_id,
                    symbol = %asset.symbol,
                    market_cap = asset.market_cap_usd,
                    "Coin info saved"
                );
                Outcome::Saved {
                    fetched: 1,
                    saved: 1,
                }
            }
            Err(e) => {
                tracing::error!(
                    symbol = %asset.symbol,
                    error = %e,
                    "Failed to save coin record"
                );
                Outcome::Failed
            }
        }
    }
}
