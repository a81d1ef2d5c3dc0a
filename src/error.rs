use thiserror::Error;

/// The main error type for datakitten operations.
///
/// These errors surface from the fetcher, the descriptor parsers and the
/// CLI. [`crate::Dataset`] accessors never return them; detection absorbs
/// every failure into an absent tag or a default value.
#[derive(Debug, Error)]
pub enum DataKittenError {
    #[error("Invalid URL '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    #[error("Fetching {url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse descriptor from {url}: {message}")]
    DescriptorParse { url: String, message: String },

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No supported origin and publishing format found for {url}")]
    Unsupported { url: String },
}
