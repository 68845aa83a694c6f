// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Lockbox host API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request encoding error
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsing error
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed device key
    #[error("Invalid device key")]
    InvalidKey,
}
