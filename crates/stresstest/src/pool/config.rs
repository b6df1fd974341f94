use crate::{Error, Result};

/// Capacity and validation settings for a [`ConnectionPool`].
///
/// `max_capacity` bounds the idle set only. Checkout never waits for capacity,
/// so more connections than `max_capacity` can be open at once; the excess is
/// closed when it is released.
///
/// [`ConnectionPool`]: crate::ConnectionPool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Connections dialed up front when the pool is built.
    pub min_capacity: usize,
    /// Upper bound on idle connections kept for reuse.
    pub max_capacity: usize,
    /// Run [`Connector::is_healthy`] on idle connections before handing them
    /// out. Off by default: idle connections are reused best effort.
    ///
    /// [`Connector::is_healthy`]: crate::Connector::is_healthy
    pub validate_idle: bool,
}

impl PoolConfig {
    pub const fn new(min_capacity: usize, max_capacity: usize) -> Self {
        Self {
            min_capacity,
            max_capacity,
            validate_idle: false,
        }
    }

    #[must_use]
    pub const fn with_validate_idle(mut self, validate_idle: bool) -> Self {
        self.validate_idle = validate_idle;
        self
    }

    /// Checks `max_capacity >= 1` and `min_capacity <= max_capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if either bound is violated.
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 || self.min_capacity > self.max_capacity {
            return Err(Error::InvalidCapacity {
                min: self.min_capacity,
                max: self.max_capacity,
            });
        }
        Ok(())
    }
}
