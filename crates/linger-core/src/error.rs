use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid exit delay: {millis} ms is not a representable duration")]
    InvalidDelay { millis: f64 },
}
