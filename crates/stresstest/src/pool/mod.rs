//! A soft-capped pool of reusable connections to one destination.
//!
//! [`ConnectionPool`] keeps a bounded set of idle connections behind a single
//! critical section. Checkout never waits: an empty pool dials a fresh
//! connection through its [`Connector`] and returns the result directly.
//! `max_capacity` is enforced only when a connection is released, so the pool
//! trades a strict bound on open connections for a checkout path that cannot
//! deadlock under load. Excess connections are closed at release, never
//! leaked.
//!
//! Closing the pool refuses every later checkout and drops all idle
//! connections. Connections already checked out stay with their holder until
//! they are released or dropped.

mod config;
mod connector;

#[cfg(test)]
mod tests;

pub use config::PoolConfig;
pub use connector::{Connector, TcpConnector};

use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;

struct PoolState<T> {
    idle: VecDeque<T>,
    closed: bool,
}

/// A pool of connections produced by a [`Connector`].
///
/// The pool is `Sync`; share it between tasks behind an `Arc`.
pub struct ConnectionPool<C: Connector> {
    config: PoolConfig,
    connector: C,
    state: Mutex<PoolState<C::Conn>>,
}

impl<C: Connector> ConnectionPool<C> {
    /// Validates `config` and dials `min_capacity` connections into the idle
    /// set.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] if the capacities are inconsistent.
    /// - [`Error::Dial`] if any of the initial connections cannot be made.
    ///   Connections dialed before the failure are closed.
    pub async fn new(config: PoolConfig, connector: C) -> Result<Self> {
        config.validate()?;

        let mut idle = VecDeque::with_capacity(config.max_capacity);
        for _ in 0..config.min_capacity {
            let conn = connector.connect().await.map_err(Error::Dial)?;
            idle.push_back(conn);
        }

        tracing::debug!(
            min = config.min_capacity,
            max = config.max_capacity,
            "connection pool ready"
        );

        Ok(Self {
            config,
            connector,
            state: Mutex::new(PoolState {
                idle,
                closed: false,
            }),
        })
    }

    /// Takes an idle connection, or dials a new one if none is idle.
    ///
    /// Idle connections are handed out as they are: one that the peer has
    /// since closed is only detected when [`PoolConfig::validate_idle`] is
    /// set. Validation drops unhealthy connections and moves on to the next.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolClosed`] if [`close`](Self::close) has been called.
    /// - [`Error::Dial`] if a new connection was needed and could not be made.
    pub async fn checkout(&self) -> Result<C::Conn> {
        loop {
            let conn = {
                let mut state = self.state.lock();
                if state.closed {
                    return Err(Error::PoolClosed);
                }
                state.idle.pop_front()
            };

            match conn {
                Some(conn) if !self.config.validate_idle => return Ok(conn),
                Some(conn) if self.connector.is_healthy(&conn) => return Ok(conn),
                Some(_stale) => {
                    tracing::debug!("dropping unhealthy idle connection");
                }
                None => break,
            }
        }

        let conn = self.connector.connect().await.map_err(Error::Dial)?;
        tracing::trace!("dialed new connection");
        Ok(conn)
    }

    /// Returns `conn` to the idle set, or closes it if the pool is closed or
    /// already holds `max_capacity` idle connections.
    pub fn release(&self, conn: C::Conn) {
        let mut state = self.state.lock();
        if state.closed || state.idle.len() >= self.config.max_capacity {
            drop(state);
            drop(conn);
            return;
        }
        state.idle.push_back(conn);
    }

    /// Marks the pool closed and drops every idle connection.
    ///
    /// Safe to call more than once.
    pub fn close(&self) {
        let drained = {
            let mut state = self.state.lock();
            state.closed = true;
            core::mem::take(&mut state.idle)
        };

        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "closing idle connections");
        }
        drop(drained);
    }

    /// Number of idle connections currently held.
    pub fn idle_len(&self) -> usize {
        self.state.lock().idle.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub const fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: Connector> core::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConnectionPool")
            .field("config", &self.config)
            .field("idle", &state.idle.len())
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}
