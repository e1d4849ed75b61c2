use crate::api::{TradeInflowClient, TradeInflowData};
use crate::auth::{AuthService, TokenPair};
use crate::db::{FlowStore, ListingStore};
use crate::schedule::{Cadence, Scheduler};
use crate::{CycleStats, Outcome, Result};
use std::sync::Arc;

/// Fund-flow polling cadence: XX:00, XX:05, ...
pub const FUND_FLOW_CADENCE: Cadence = Cadence::minutes(5);

/// Polls fund-flow series for every listed asset
pub struct FundFlowIngestor {
    auth: AuthService,
    client: TradeInflowClient,
    assets: Arc<dyn ListingStore>,
    flows: Arc<dyn FlowStore>,
}

impl FundFlowIngestor {
    pub fn new(
        auth: AuthService,
        client: TradeInflowClient,
        assets: Arc<dyn ListingStore>,
        flows: Arc<dyn FlowStore>,
    ) -> Self {
        Self {
            auth,
            client,
            assets,
            flows,
        }
    }

    /// Run forever, carrying the token from cycle to cycle
    pub async fn run(self, scheduler: Scheduler, mut token: TokenPair) {
        tracing::info!("Starting trade inflow task with 5-minute interval");

        for cycle in 0u64.. {
            scheduler.pace(FUND_FLOW_CADENCE, cycle).await;

            match self.run_cycle(&mut token).await {
                Ok(stats) => stats.log_summary("trade_inflow"),
                Err(e) => tracing::error!(error = %e, "Trade inflow cycle abandoned"),
            }
        }
    }

    /// One cycle over a snapshot of known asset ids
    ///
    /// `token` is replaced in place whenever a re-login happens, so later
    /// assets (and later cycles) reuse the fresh token. Per-asset failures are
    /// counted, never propagated; only failing to read the ids aborts.
    pub async fn run_cycle(&self, token: &mut TokenPair) -> Result<CycleStats> {
        tracing::info!("Processing trade inflow data");

        let ids = self.assets.asset_ids().await?;
        tracing::info!(count = ids.len(), "Found VSTokenIDs in database");

        let mut stats = CycleStats::begin(ids.len());

        for id in ids {
            let outcome = match self.process_asset(token, id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        vs_token_id = id,
                        error = %e,
                        "Failed to process trade inflow for token"
                    );
                    Outcome::Failed
                }
            };
            stats.tally(outcome);
        }

        Ok(stats.finish())
    }

    /// Validate the token, fetch one asset's series and upsert each row
    pub async fn process_asset(&self, token: &mut TokenPair, id: i64) -> Result<Outcome> {
        *token = self.auth.validate_and_refresh(token).await?;

        let data = self.client.get_trade_inflow(&token.account_token, id).await?;
        Ok(self.save_series(id, data).await)
    }

    async fn save_series(&self, id: i64, data: TradeInflowData) -> Outcome {
        let Some(rows) = data.list else {
            tracing::info!(vs_token_id = id, symbol = %data.symbol, "No trade inflow data found");
            return Outcome::Empty;
        };

        tracing::info!(
            vs_token_id = id,
            symbol = %data.symbol,
            list_length = rows.len(),
            "Found trade inflow data"
        );

        let fetched = rows.len();
        let mut saved = 0;

        for row in rows {
            let record = row.into_record(&data.symbol);
            match self.flows.upsert_flow_record(&record).await {
                Ok(()) => {
                    saved += 1;
                    tracing::debug!(
                        symbol = %record.symbol,
                        time = %record.time,
                        "Trade inflow saved"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        symbol = %record.symbol,
                        time = %record.time,
                        error = %e,
                        "Failed to save trade inflow record"
                    );
                }
            }
        }

        Outcome::Saved { fetched, saved }
    }
}
