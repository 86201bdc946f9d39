#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Cannot connect to server: {0}")]
    Unreachable(String),

    #[error("HTTP Error Status Code = {0}")]
    HttpError(u16),

    #[error("Server reported failure: {0}")]
    ServerError(String),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}
