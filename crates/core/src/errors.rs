use thiserror::Error;

/// Unified error type for the whole cryptopulse-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Market data ─────────────────────────────────────────────────
    #[error("Market data fetch failed ({source_name}): {message}")]
    DataFetch {
        source_name: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unknown market data source: {0}")]
    UnknownSource(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Failed to read persisted state: {0}")]
    PersistenceRead(String),

    #[error("Persisted state is malformed: {0}")]
    PersistenceParse(String),

    #[error("Failed to write persisted state: {0}")]
    PersistenceWrite(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Business logic ──────────────────────────────────────────────
    #[error("Invalid portfolio entry: {0}")]
    InvalidAddInput(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid setting {key}={value:?}")]
    InvalidSetting { key: String, value: String },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; the query may hold an API key.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
