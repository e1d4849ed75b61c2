pub mod coins;
pub mod lenient;
pub mod trade_inflow;

pub use coins::{CoinClient, CoinEntry, CoinPage};
pub use trade_inflow::{TradeInflowClient, TradeInflowData, TradeInflowEntry};

use crate::config::ApiConfig;
use crate::{Error, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Business status code for a successful call
pub const SUCCESS_CODE: i64 = 200;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Shared HTTP plumbing for the ValueScan API
///
/// Cloneable; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Outer wrapper common to every endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub req_id: String,
    #[serde(default)]
    pub user_role: String,
}

impl Envelope {
    /// Check the business code and decode `data` into `T`
    ///
    /// `null` and `""` payloads are reported as [`Error::EmptyData`].
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        if self.code != SUCCESS_CODE {
            return Err(Error::Api {
                code: self.code,
                msg: self.msg,
            });
        }

        match &self.data {
            Value::Null => return Err(Error::EmptyData),
            Value::String(s) if s.is_empty() => return Err(Error::EmptyData),
            _ => {}
        }

        Ok(serde_json::from_value(self.data)?)
    }
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read a response as an envelope, rejecting non-2xx statuses
    pub async fn read_envelope(response: Response) -> Result<Envelope> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: i64,
    }

    fn envelope(code: i64, data: Value) -> Envelope {
        serde_json::from_value(json!({
            "code": code,
            "data": data,
            "msg": "msg",
            "reqId": "req-1",
            "userRole": "user"
        }))
        .unwrap()
    }

    #[test]
    fn test_into_data_success() {
        let payload: Payload = envelope(200, json!({"value": 7})).into_data().unwrap();
        assert_eq!(payload.value, 7);
    }

    #[test]
    fn test_into_data_business_error() {
        let err = envelope(401, json!({"value": 7}))
            .into_data::<Payload>()
            .unwrap_err();
        assert!(matches!(err, Error::Api { code: 401, .. }));
    }

    #[test]
    fn test_into_data_empty() {
        assert!(matches!(
            envelope(200, Value::Null).into_data::<Payload>(),
            Err(Error::EmptyData)
        ));
        assert!(matches!(
            envelope(200, json!("")).into_data::<Payload>(),
            Err(Error::EmptyData)
        ));
    }

    #[test]
    fn test_envelope_missing_optional_fields() {
        let env: Envelope = serde_json::from_str(r#"{"code": 500}"#).unwrap();
        assert_eq!(env.code, 500);
        assert!(env.data.is_null());
        assert!(env.msg.is_empty());
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:1234/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.url("/api/x"), "http://localhost:1234/api/x");
    }
}
