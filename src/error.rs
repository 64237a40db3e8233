use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed input: {0}")]
    MalformedInput(binrw::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid state, unable to encode: {0}")]
    InvalidState(binrw::Error),
}
