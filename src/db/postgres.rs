use super::{FlowStore, ListingStore};
use crate::config::DatabaseConfig;
use crate::models::{FlowRecord, ListedAsset};
use crate::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;

/// Postgres-backed store for listed assets and fund-flow records
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run pending migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let ssl_mode = PgSslMode::from_str(&config.ssl_mode)?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.db_name)
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.db_name,
            "Connected to Postgres"
        );

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool (migrations not run)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migration completed successfully");
        Ok(())
    }
}

#[async_trait]
impl ListingStore for PostgresStore {
    async fn upsert_asset(&self, asset: &ListedAsset) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vs_coin_info (vs_token_id, name, symbol, market_cap)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (vs_token_id) DO UPDATE SET
                name = EXCLUDED.name,
                symbol = EXCLUDED.symbol,
                market_cap = EXCLUDED.market_cap,
                updated_at = NOW()
            "#,
        )
        .bind(asset.token_id)
        .bind(&asset.name)
        .bind(&asset.symbol)
        .bind(asset.market_cap_usd)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn asset_ids(&self) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT vs_token_id FROM vs_coin_info ORDER BY vs_token_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[async_trait]
impl FlowStore for PostgresStore {
    async fn upsert_flow_record(&self, record: &FlowRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO coin_trade_inflow (
                symbol, time_particle_enum, time, stop,
                stop_trade_inflow, stop_trade_amount,
                stop_trade_inflow_change, stop_trade_amount_change,
                contract, contract_trade_inflow, contract_trade_amount,
                contract_trade_inflow_change, contract_trade_amount_change,
                stop_trade_in, stop_trade_out, contract_trade_in, contract_trade_out
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (symbol, time) DO UPDATE SET
                time_particle_enum = EXCLUDED.time_particle_enum,
                stop = EXCLUDED.stop,
                stop_trade_inflow = EXCLUDED.stop_trade_inflow,
                stop_trade_amount = EXCLUDED.stop_trade_amount,
                stop_trade_inflow_change = EXCLUDED.stop_trade_inflow_change,
                stop_trade_amount_change = EXCLUDED.stop_trade_amount_change,
                contract = EXCLUDED.contract,
                contract_trade_inflow = EXCLUDED.contract_trade_inflow,
                contract_trade_amount = EXCLUDED.contract_trade_amount,
                contract_trade_inflow_change = EXCLUDED.contract_trade_inflow_change,
                contract_trade_amount_change = EXCLUDED.contract_trade_amount_change,
                stop_trade_in = EXCLUDED.stop_trade_in,
                stop_trade_out = EXCLUDED.stop_trade_out,
                contract_trade_in = EXCLUDED.contract_trade_in,
                contract_trade_out = EXCLUDED.contract_trade_out,
                updated_at = NOW()
            "#,
        )
        .bind(&record.symbol)
        .bind(record.time_particle)
        .bind(&record.time)
        .bind(record.stop)
        .bind(record.stop_trade_inflow)
        .bind(record.stop_trade_amount)
        .bind(record.stop_trade_inflow_change)
        .bind(record.stop_trade_amount_change)
        .bind(record.contract)
        .bind(record.contract_trade_inflow)
        .bind(record.contract_trade_amount)
        .bind(record.contract_trade_inflow_change)
        .bind(record.contract_trade_amount_change)
        .bind(record.stop_trade_in)
        .bind(record.stop_trade_out)
        .bind(record.contract_trade_in)
        .bind(record.contract_trade_out)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> PostgresStore {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
        let pool = PgPool::connect(&url).await.unwrap();
        let store = PostgresStore::from_pool(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    #[ignore] // Requires a running Postgres (TEST_DATABASE_URL)
    async fn test_asset_upsert_is_idempotent() {
        let store = test_store().await;

        let asset = ListedAsset {
            token_id: 990_001,
            name: "Test Coin".to_string(),
            symbol: "TST".to_string(),
            market_cap_usd: 123.0,
        };

        store.upsert_asset(&asset).await.unwrap();
        store.upsert_asset(&asset).await.unwrap();

        let ids = store.asset_ids().await.unwrap();
        assert_eq!(ids.iter().filter(|id| **id == 990_001).count(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires a running Postgres (TEST_DATABASE_URL)
    async fn test_flow_upsert_overwrites() {
        let store = test_store().await;

        let mut record = FlowRecord {
            symbol: "TST".to_string(),
            time: "2024-06-01 10:00:00".to_string(),
            stop_trade_inflow: 1.0,
            ..Default::default()
        };
        store.upsert_flow_record(&record).await.unwrap();

        record.stop_trade_inflow = 2.0;
        store.upsert_flow_record(&record).await.unwrap();

        let (count, inflow): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), MAX(stop_trade_inflow) FROM coin_trade_inflow WHERE symbol = $1 AND time = $2",
        )
        .bind(&record.symbol)
        .bind(&record.time)
        .fetch_one(&store.pool)
        .await
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(inflow, 2.0);
    }
}
