#![allow(dead_code)]

use async_trait::async_trait;
use fundsync::api::ApiClient;
use fundsync::config::{ApiConfig, LoginConfig};
use fundsync::db::{FlowStore, ListingStore};
use fundsync::{AuthService, Error, FlowRecord, ListedAsset, Result};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// In-memory stand-in for Postgres with the same upsert keys
#[derive(Default)]
pub struct MemoryStore {
    pub assets: Mutex<BTreeMap<i64, ListedAsset>>,
    pub flows: Mutex<BTreeMap<(String, String), FlowRecord>>,
    /// Symbols whose flow writes fail, to exercise row-level isolation
    pub failing_symbols: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn with_ids(ids: &[i64]) -> Self {
        let store = Self::default();
        {
            let mut assets = store.assets.lock().unwrap();
            for id in ids {
                assets.insert(
                    *id,
                    ListedAsset {
                        token_id: *id,
                        name: format!("Coin {id}"),
                        symbol: format!("C{id}"),
                        market_cap_usd: 0.0,
                    },
                );
            }
        }
        store
    }

    pub fn asset_count(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    pub fn asset(&self, id: i64) -> Option<ListedAsset> {
        self.assets.lock().unwrap().get(&id).cloned()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.lock().unwrap().len()
    }

    pub fn flow(&self, symbol: &str, time: &str) -> Option<FlowRecord> {
        self.flows
            .lock()
            .unwrap()
            .get(&(symbol.to_string(), time.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn upsert_asset(&self, asset: &ListedAsset) -> Result<()> {
        self.assets
            .lock()
            .unwrap()
            .insert(asset.token_id, asset.clone());
        Ok(())
    }

    async fn asset_ids(&self) -> Result<Vec<i64>> {
        Ok(self.assets.lock().unwrap().keys().copied().collect())
    }
}

#[async_trait]
impl FlowStore for MemoryStore {
    async fn upsert_flow_record(&self, record: &FlowRecord) -> Result<()> {
        if self.failing_symbols.lock().unwrap().contains(&record.symbol) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        self.flows
            .lock()
            .unwrap()
            .insert((record.symbol.clone(), record.time.clone()), record.clone());
        Ok(())
    }
}

pub fn api_client(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.url(),
        timeout_secs: 5,
    })
    .unwrap()
}

pub fn auth_service(api: ApiClient) -> AuthService {
    AuthService::new(
        api,
        LoginConfig {
            phone_or_email: "ops@example.com".to_string(),
            code: "111111".to_string(),
        },
    )
}

pub fn login_body(account_token: &str) -> String {
    serde_json::json!({
        "code": 200,
        "data": {"account_token": account_token, "refresh_token": "refresh"},
        "msg": "success",
        "reqId": "login-req",
        "userRole": "member"
    })
    .to_string()
}
