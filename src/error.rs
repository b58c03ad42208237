use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfPathsError {
    #[error("TeamCity API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unrecognized build timestamp '{value}': {source}")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, CfPathsError>;
