use crate::{RandSource, handoff};
use core::time::Duration;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Timing of one producer: a random start offset, then a fixed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Exclusive upper bound of the random start delay, in whole seconds.
    pub initial_jitter: Duration,
    /// Pause between one accepted message and the next.
    pub period: Duration,
}

impl Schedule {
    pub const fn new(initial_jitter: Duration, period: Duration) -> Self {
        Self {
            initial_jitter,
            period,
        }
    }

    /// Draws a start delay uniformly from `[0, initial_jitter)` seconds.
    pub fn initial_delay<R: RandSource<u64>>(&self, rand: &R) -> Duration {
        match self.initial_jitter.as_secs() {
            0 => Duration::ZERO,
            secs => Duration::from_secs(rand.rand() % secs),
        }
    }
}

/// Why a producer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerExit {
    Cancelled,
    /// The paired dispatcher has exited and nothing will take messages.
    DispatcherGone,
}

/// The request line sent on behalf of `identity`.
pub fn format_request(identity: &str) -> String {
    format!("GET /{identity} HTTP/1.0\r\n\r\n")
}

/// Periodically hands a request for `identity` to its dispatcher.
///
/// After a random start delay this loops forever: format a request, hand it
/// off (waiting until the dispatcher takes it), sleep one period. It stops
/// only when `token` is cancelled or the dispatcher is gone.
pub async fn producer_loop<R: RandSource<u64>>(
    identity: Arc<str>,
    schedule: Schedule,
    rand: R,
    tx: handoff::Sender<String>,
    token: CancellationToken,
) -> ProducerExit {
    let delay = schedule.initial_delay(&rand);
    tracing::debug!(%identity, ?delay, "producer started");

    tokio::select! {
        biased;
        () = token.cancelled() => return ProducerExit::Cancelled,
        () = sleep(delay) => {}
    }

    loop {
        let request = format_request(&identity);
        let sent = tokio::select! {
            biased;
            () = token.cancelled() => return ProducerExit::Cancelled,
            sent = tx.send(request) => sent,
        };
        if sent.is_err() {
            tracing::debug!(%identity, "dispatcher gone, producer stopping");
            return ProducerExit::DispatcherGone;
        }

        tokio::select! {
            biased;
            () = token.cancelled() => return ProducerExit::Cancelled,
            () = sleep(schedule.period) => {}
        }
    }
}
