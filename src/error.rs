use thiserror::Error;

/// Errors produced by the ingestion pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Envelope `code` other than 200
    #[error("API returned code={code}, msg={msg}")]
    Api { code: i64, msg: String },

    #[error("empty data in response")]
    EmptyData,

    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("failed to re-login: {0}")]
    Relogin(#[source] Box<Error>),
}

pub type Result<T> = std::result::Result<T, Error>;
