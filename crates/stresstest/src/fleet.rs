//! Orchestration of all simulated clients.
//!
//! A [`Fleet`] owns everything the clients share: the connection pool, the
//! completion barrier, the set of assigned identifiers and the root
//! cancellation token. [`Fleet::spawn`] starts one producer/dispatcher pair
//! per identity; [`Fleet::wait`] blocks until every dispatcher has stopped
//! and then closes the pool.

use crate::{
    CompletionBarrier, ConnectionPool, ConnectionReuse, Connector, IdentifierAllocator,
    IdentifierSource, RandSource, Result, Schedule, dispatch_loop, handoff, producer_loop,
};
use core::time::Duration;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Settings shared by every pair in a [`Fleet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetConfig {
    /// Number of simulated clients.
    pub application_count: usize,
    /// Pause between two requests of the same client.
    pub send_period: Duration,
    /// Exclusive upper bound of each client's random start delay.
    pub initial_jitter: Duration,
    pub connection_reuse: ConnectionReuse,
}

impl FleetConfig {
    pub const DEFAULT_SEND_PERIOD: Duration = Duration::from_secs(60);
    pub const DEFAULT_INITIAL_JITTER: Duration = Duration::from_secs(59);

    pub const fn new(application_count: usize) -> Self {
        Self {
            application_count,
            send_period: Self::DEFAULT_SEND_PERIOD,
            initial_jitter: Self::DEFAULT_INITIAL_JITTER,
            connection_reuse: ConnectionReuse::Discard,
        }
    }

    const fn schedule(&self) -> Schedule {
        Schedule::new(self.initial_jitter, self.send_period)
    }
}

/// Handle to one running producer/dispatcher pair.
#[derive(Debug, Clone)]
pub struct PairHandle {
    identity: Arc<str>,
    token: CancellationToken,
}

impl PairHandle {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Stops this pair only.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// The set of simulated clients sharing one connection pool.
pub struct Fleet<C: Connector> {
    config: FleetConfig,
    pool: Arc<ConnectionPool<C>>,
    barrier: CompletionBarrier,
    allocator: IdentifierAllocator,
    pairs: Vec<PairHandle>,
    shutdown_token: CancellationToken,
}

impl<C> Fleet<C>
where
    C: Connector,
    C::Conn: AsyncWrite + Unpin,
{
    pub fn new(pool: Arc<ConnectionPool<C>>, config: FleetConfig) -> Self {
        Self {
            config,
            pool,
            barrier: CompletionBarrier::new(),
            allocator: IdentifierAllocator::new(),
            pairs: Vec::with_capacity(config.application_count),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Starts `application_count` pairs, each under a fresh identifier drawn
    /// from `source`.
    ///
    /// The source must be able to supply at least `application_count`
    /// distinct identifiers. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Propagates the first error from `source`. Pairs started before the
    /// error keep running.
    pub fn spawn<S, R>(&mut self, source: &mut S, rand: R) -> Result<()>
    where
        S: IdentifierSource + ?Sized,
        R: RandSource<u64> + Clone + Send + 'static,
    {
        tracing::info!(count = self.config.application_count, "starting applications");

        for _ in 0..self.config.application_count {
            let identity = self.allocator.allocate(source)?;
            let guard = self.barrier.register();
            let token = self.shutdown_token.child_token();
            let (tx, rx) = handoff::channel();
            let span = tracing::info_span!(parent: None, "application", %identity);

            tokio::spawn(
                producer_loop(
                    Arc::clone(&identity),
                    self.config.schedule(),
                    rand.clone(),
                    tx,
                    token.clone(),
                )
                .instrument(span.clone()),
            );
            tokio::spawn(
                dispatch_loop(
                    Arc::clone(&identity),
                    Arc::clone(&self.pool),
                    rx,
                    self.config.connection_reuse,
                    token.clone(),
                    guard,
                )
                .instrument(span.clone()),
            );

            span.in_scope(|| {
                tracing::info!(monotonic_counter.applications_started = 1_u64, %identity, "new application");
            });
            self.pairs.push(PairHandle { identity, token });
        }
        Ok(())
    }

    /// Identifiers of every pair started so far, in start order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(PairHandle::identity)
    }

    pub fn pairs(&self) -> &[PairHandle] {
        &self.pairs
    }

    /// Cancels the pair running under `identity`. Returns `false` if there is
    /// no such pair.
    pub fn cancel(&self, identity: &str) -> bool {
        match self.pairs.iter().find(|p| p.identity() == identity) {
            Some(pair) => {
                pair.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every pair. Pending sleeps, handoffs, dials and writes are
    /// abandoned, so every task stops without waiting for the network.
    pub fn shutdown(&self) {
        tracing::info!("cancelling all applications");
        self.shutdown_token.cancel();
    }

    pub const fn pool(&self) -> &Arc<ConnectionPool<C>> {
        &self.pool
    }

    pub const fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Dispatchers still running.
    pub fn outstanding(&self) -> usize {
        self.barrier.outstanding()
    }

    /// Waits for every dispatcher to stop, then stops the producers and
    /// closes the pool.
    pub async fn wait(&self) {
        self.barrier.wait().await;
        tracing::info!("all applications stopped");
        self.shutdown_token.cancel();
        self.pool.close();
        tracing::debug!("connection pool closed");
    }
}

impl<C: Connector> core::fmt::Debug for Fleet<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fleet")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .field("pairs", &self.pairs.len())
            .field("outstanding", &self.barrier.outstanding())
            .finish_non_exhaustive()
    }
}
