//! Error types for the load generator core.
//!
//! All failures are local to the caller that hit them: a dial error stops one
//! dispatcher, an exhausted identifier source stops fleet startup. There is no
//! global error channel.

use std::io;
use thiserror::Error;

/// A result type defaulting to [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `stresstest` can produce.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The connection factory could not reach the destination.
    #[error("failed to dial destination: {0}")]
    Dial(#[source] io::Error),

    /// A checkout was attempted after the pool was closed.
    #[error("pool is closed")]
    PoolClosed,

    /// The pool was configured with capacities it cannot honor.
    #[error("invalid pool capacity settings (min = {min}, max = {max})")]
    InvalidCapacity { min: usize, max: usize },

    /// A finite identifier source ran out of values.
    #[error("identifier source exhausted")]
    SourceExhausted,

    /// The identifier source could not be read.
    #[error("identifier source I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns `true` if this error means the pool refused the checkout
    /// because it was closed.
    pub const fn is_pool_closed(&self) -> bool {
        matches!(self, Self::PoolClosed)
    }
}
