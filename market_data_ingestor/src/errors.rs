use thiserror::Error;

use crate::{io::sink::SinkError, pipeline::tz::TzError, providers::ProviderError};

/// Why processing one symbol (or the crypto batch) failed.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Fetching from a data provider failed (transport, non-2xx, bad payload).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Writing an output file failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// A bucket edge could not be placed on the local clock.
    #[error("Resample error: {0}")]
    Resample(#[from] TzError),
}
