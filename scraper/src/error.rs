use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("verification challenge at {url} was not resolved before input ended")]
    ChallengeUnresolved { url: String },

    #[error("invalid selector {0:?}")]
    Selector(String),
}
