//! Observations and the clustering state
mod datum;
mod partition;

pub use datum::BinomialDatum;
pub use partition::{Cell, Partition, PartitionError};
