use super::{lenient, ApiClient};
use crate::models::FlowRecord;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer};

const TRADE_INFLOW_PATH: &str = "/api/trade/getCoinTradeInflow";

/// Client for the per-asset fund-flow endpoint
#[derive(Clone)]
pub struct TradeInflowClient {
    api: ApiClient,
}

/// Fund-flow payload for one asset
///
/// `list` is `None` when the upstream has no data for the asset, including
/// when the list field is not an array. Rows that are not objects are dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInflowData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(default, rename = "coinTradeInflowDtoList", deserialize_with = "inflow_rows")]
    pub list: Option<Vec<TradeInflowEntry>>,
}

fn inflow_rows<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<TradeInflowEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(items) = lenient::array(deserializer)? else {
        return Ok(None);
    };

    let rows = items
        .into_iter()
        .filter_map(|item| {
            if !item.is_object() {
                tracing::warn!(row = %item, "Dropping malformed trade inflow row");
                return None;
            }
            serde_json::from_value(item).ok()
        })
        .collect();

    Ok(Some(rows))
}

/// One time-series row; every field is coerced, see [`lenient`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInflowEntry {
    #[serde(default, deserialize_with = "lenient::int")]
    pub time_particle_enum: i32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub stop: bool,
    #[serde(default, deserialize_with = "lenient::float")]
    pub stop_trade_inflow: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub stop_trade_amount: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub stop_trade_inflow_change: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub stop_trade_amount_change: f64,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub contract: bool,
    #[serde(default, deserialize_with = "lenient::float")]
    pub contract_trade_inflow: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub contract_trade_amount: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub contract_trade_inflow_change: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub contract_trade_amount_change: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub stop_trade_in: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub stop_trade_out: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub contract_trade_in: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub contract_trade_out: f64,
}

impl TradeInflowEntry {
    /// Attach the outer payload's symbol to produce a storable record
    pub fn into_record(self, symbol: &str) -> FlowRecord {
        FlowRecord {
            symbol: symbol.to_string(),
            time_particle: self.time_particle_enum,
            time: self.time,
            stop: self.stop,
            stop_trade_inflow: self.stop_trade_inflow,
            stop_trade_amount: self.stop_trade_amount,
            stop_trade_inflow_change: self.stop_trade_inflow_change,
            stop_trade_amount_change: self.stop_trade_amount_change,
            contract: self.contract,
            contract_trade_inflow: self.contract_trade_inflow,
            contract_trade_amount: self.contract_trade_amount,
            contract_trade_inflow_change: self.contract_trade_inflow_change,
            contract_trade_amount_change: self.contract_trade_amount_change,
            stop_trade_in: self.stop_trade_in,
            stop_trade_out: self.stop_trade_out,
            contract_trade_in: self.contract_trade_in,
            contract_trade_out: self.contract_trade_out,
        }
    }
}

impl TradeInflowClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Get fund-flow series for one listed asset
    /// Endpoint: GET /api/trade/getCoinTradeInflow?keyword={token_id}
    ///
    /// An empty `data` payload is returned as an empty result, not an error.
    pub async fn get_trade_inflow(
        &self,
        access_token: &str,
        token_id: i64,
    ) -> Result<TradeInflowData> {
        let url = self.api.url(TRADE_INFLOW_PATH);

        let response = self
            .api
            .http()
            .get(&url)
            .query(&[("keyword", token_id.to_string())])
            .header("accessToken", access_token)
            .send()
            .await?;

        let envelope = ApiClient::read_envelope(response).await?;

        tracing::debug!(
            vs_token_id = token_id,
            code = envelope.code,
            req_id = %envelope.req_id,
            "Trade inflow response received"
        );

        match envelope.into_data() {
            Ok(data) => Ok(data),
            Err(Error::EmptyData) => Ok(TradeInflowData::default()),
            Err(e) => Err(e),
        }
    }
}
