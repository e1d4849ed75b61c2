use super::{lenient, ApiClient};
use crate::models::ListedAsset;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const QUERY_COIN_PATH: &str = "/api/vs-token/queryCoin";

/// Listing page size, fixed by the upstream API
pub const PAGE_SIZE: u32 = 100;

/// Client for the coin listing endpoint
#[derive(Clone)]
pub struct CoinClient {
    api: ApiClient,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoinQuery<'a> {
    search: &'a str,
    is_binance: bool,
    page: u32,
    page_size: u32,
}

/// One page of the listing
///
/// `total` is `None` when upstream omits it or sends something unparseable.
#[derive(Debug, Default, Deserialize)]
pub struct CoinPage {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "coin_entries")]
    pub list: Vec<CoinEntry>,
}

/// Raw listing entry; numeric fields arrive as strings
///
/// A list element that is not an object decodes to an entry with no fields,
/// which normalization then rejects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinEntry {
    #[serde(default)]
    pub vs_token_id: Value,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(default)]
    pub market_cap: Value,
}

impl From<Value> for CoinEntry {
    fn from(value: Value) -> Self {
        if value.is_object() {
            serde_json::from_value(value).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

fn coin_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<CoinEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = lenient::array(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().map(CoinEntry::from).collect())
}

impl TryFrom<&CoinEntry> for ListedAsset {
    type Error = Error;

    fn try_from(entry: &CoinEntry) -> Result<Self> {
        let token_id = match &entry.vs_token_id {
            Value::String(s) => s.trim().parse::<i64>().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
        .ok_or_else(|| Error::InvalidField {
            field: "vsTokenId",
            value: lenient::to_string(&entry.vs_token_id),
        })?;

        let market_cap_usd = match &entry.market_cap {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidField {
            field: "marketCap",
            value: lenient::to_string(&entry.market_cap),
        })?;

        Ok(ListedAsset {
            token_id,
            name: entry.name.clone(),
            symbol: entry.symbol.clone(),
            market_cap_usd,
        })
    }
}

impl CoinClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Query one page of exchange-listed coins
    /// Endpoint: POST /api/vs-token/queryCoin (bearer auth)
    pub async fn query_page(&self, access_token: &str, page: u32) -> Result<CoinPage> {
        let url = self.api.url(QUERY_COIN_PATH);
        let body = CoinQuery {
            search: "",
            is_binance: true,
            page,
            page_size: PAGE_SIZE,
        };

        tracing::debug!(url = %url, page, "Sending coin query request");

        let response = self
            .api
            .http()
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        let envelope = ApiClient::read_envelope(response).await?;
        let req_id = envelope.req_id.clone();
        let page_data: CoinPage = envelope.into_data()?;

        tracing::info!(
            page,
            total = ?page_data.total,
            count = page_data.list.len(),
            req_id = %req_id,
            "Coin query successful"
        );

        Ok(page_data)
    }

    /// Fetch every listing page, up to `max_pages`
    ///
    /// Stops once `total` entries are collected or a page comes back empty;
    /// without a usable `total` only the empty page ends it. Any page failing
    /// fails the whole fetch.
    pub async fn query_all(&self, access_token: &str, max_pages: u32) -> Result<Vec<CoinEntry>> {
        let mut entries = Vec::new();

        for page in 1..=max_pages.max(1) {
            let page_data = self.query_page(access_token, page).await?;
            let fetched = page_data.list.len();
            entries.extend(page_data.list);

            let complete = page_data
                .total
                .is_some_and(|total| entries.len() as u64 >= total);
            if fetched == 0 || complete {
                break;
            }
        }

        Ok(entries)
    }
}
