//! # `stresstest`: the concurrency core of a TCP load generator
//!
//! `stresstest` simulates many independent clients. Each client is a pair of
//! Tokio tasks: a **producer** that formats a request on a fixed period, and a
//! **dispatcher** that sends it over a connection checked out of a shared,
//! soft-capped [`ConnectionPool`].
//!
//! ## Highlights
//!
//! - **Non-blocking pool**: checkout never waits for capacity; an empty pool
//!   dials a fresh connection. `max_capacity` bounds idle connections and is
//!   enforced at release time.
//! - **Rendezvous handoff**: a producer cannot create its next request until
//!   its dispatcher has taken the current one, so each client has at most one
//!   message in flight and messages stay in order.
//! - **Accounted shutdown**: a [`CompletionBarrier`] counts live dispatchers;
//!   closing the pool stops every dispatcher at its next checkout.
//! - **Cancellable**: every pair runs under a child [`CancellationToken`] of
//!   its [`Fleet`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stresstest::{ConnectionPool, Fleet, FleetConfig, Nato, PoolConfig, TcpConnector, ThreadRandom};
//!
//! # async fn run() -> stresstest::Result<()> {
//! let pool = ConnectionPool::new(PoolConfig::new(5, 20), TcpConnector::new("127.0.0.1", 80)).await?;
//! let mut fleet = Fleet::new(Arc::new(pool), FleetConfig::new(20));
//! fleet.spawn(&mut Nato::default(), ThreadRandom)?;
//! fleet.wait().await;
//! # Ok(())
//! # }
//! ```
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod barrier;
mod error;
mod fleet;
pub mod handoff;
mod identifier;
mod pool;
mod rand;
mod task;

pub use crate::barrier::*;
pub use crate::error::*;
pub use crate::fleet::*;
pub use crate::identifier::*;
pub use crate::pool::*;
pub use crate::rand::*;
pub use crate::task::*;
