use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reported by the upstream service: non-success status, or an
    /// `error`, `exception` or `validation` marker in the response envelope.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Success envelope whose payload does not have the expected shape.
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("ICS generation failed: {0}")]
    IcsGeneration(String),

    #[error("Network timeout")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;
