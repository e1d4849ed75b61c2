use serde::{Deserialize, Serialize};

/// A coin from the exchange listing, keyed by its ValueScan token id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListedAsset {
    pub token_id: i64,
    pub name: String,
    pub symbol: String,
    pub market_cap_usd: f64,
}

/// One fund-flow data point for a symbol, keyed by `(symbol, time)`
///
/// "stop" metrics are spot trading, "contract" metrics are derivatives.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlowRecord {
    pub symbol: String,
    pub time_particle: i32,
    pub time: String,
    pub stop: bool,
    pub stop_trade_inflow: f64,
    pub stop_trade_amount: f64,
    pub stop_trade_inflow_change: f64,
    pub stop_trade_amount_change: f64,
    pub contract: bool,
    pub contract_trade_inflow: f64,
    pub contract_trade_amount: f64,
    pub contract_trade_inflow_change: f64,
    pub contract_trade_amount_change: f64,
    pub stop_trade_in: f64,
    pub stop_trade_out: f64,
    pub contract_trade_in: f64,
    pub contract_trade_out: f64,
}
