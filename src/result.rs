//! Errors raised by the chain driver
use thiserror::Error;

use crate::data::PartitionError;
use crate::sampler::ConfigError;
use crate::trace::TraceError;

pub type Result<T> = std::result::Result<T, DpError>;

#[derive(Debug, Error)]
pub enum DpError {
    /// There are no observations to cluster
    #[error("cannot run a chain on empty data")]
    EmptyData,
    /// The partition covers a different number of items than the data
    #[error("partition has {n_items} items but there are {n_data} data")]
    PartitionSizeMismatch { n_items: usize, n_data: usize },
    /// The partition is malformed
    #[error("invalid partition: {0}")]
    Partition(#[from] PartitionError),
    /// The concentration parameter is not positive and finite
    #[error("alpha must be positive and finite, got {alpha}")]
    InvalidAlpha { alpha: f64 },
    /// A snapshot does not carry one parameter value per label
    #[error("{n_labels} labels but {n_params} parameter values")]
    LabelLengthMismatch { n_labels: usize, n_params: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The trace sink rejected a snapshot. The chain state is still valid.
    #[error("trace sink failed: {0}")]
    Trace(#[from] TraceError),
}
