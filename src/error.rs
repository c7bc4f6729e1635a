use std::any::Any;
use std::io;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// `waited` is the time actually spent waiting, never less than the requested timeout.
    #[error("flag did not reach the expected state within {waited:?}")]
    Timeout { waited: Duration },
    #[error("worker #{worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },
    #[error("failed to spawn worker #{worker}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },
    #[error("{threads} threads x {increments} increments does not fit in the counter")]
    TooManyIncrements { threads: usize, increments: u64 },
}

impl Error {
    /// Builds the error for a thread whose `join` returned a panic payload.
    pub fn panicked(worker: usize, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            text.to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Error::WorkerPanicked { worker, message }
    }
}
