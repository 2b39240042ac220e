use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("invalid opening hours: {0}")]
    InvalidSchedule(String),
    #[error("invalid ranking config: {0}")]
    InvalidConfig(String),
}
