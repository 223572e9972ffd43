use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("mechanism is not supported: {0}")]
    UnsupportedMechanism(String),

    #[error("connection {0} has no mechanism")]
    MissingMechanism(String),

    #[error("no supported mechanism in preferences for network service: {0}")]
    NoSupportedMechanism(String),
}
