#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("request failed with status {0}: {1}")]
    HttpStatus(reqwest::StatusCode, String),
    #[error("device key is not a valid header value")]
    InvalidDeviceKey,
}
