//! simulation errors

use thiserror::Error;

use super::channel;

#[derive(Error, Debug)]
pub enum Error {
    #[error("clock error: {0}")]
    Clock(String),
    #[error(transparent)]
    Channel(#[from] channel::Error),
}
