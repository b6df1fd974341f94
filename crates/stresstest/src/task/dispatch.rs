use crate::{BarrierGuard, ConnectionPool, Connector, Error, Result, handoff};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// What a dispatcher does with a connection after writing to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionReuse {
    /// Close the connection. Every send checks out a fresh connection and the
    /// pool's idle set is only drawn down, never refilled.
    #[default]
    Discard,
    /// Hand the connection back through [`ConnectionPool::release`] when the
    /// write succeeded.
    Release,
}

/// Why a dispatcher stopped.
#[derive(Debug)]
pub enum DispatchExit {
    /// Checkout failed: the pool is closed or the destination refused.
    CheckoutFailed(Error),
    /// The paired producer has exited.
    ProducerGone,
    Cancelled,
}

/// Receives requests for `identity` and sends each over a pooled connection.
///
/// The first checkout failure ends the loop for good. Write failures are
/// logged and otherwise ignored: delivery is not verified. Cancellation is
/// honored at any point, including while a dial is pending. Each send runs
/// in its own `send` span. `guard` is held for as long as the dispatcher
/// runs.
pub async fn dispatch_loop<C>(
    identity: Arc<str>,
    pool: Arc<ConnectionPool<C>>,
    mut rx: handoff::Receiver<String>,
    reuse: ConnectionReuse,
    token: CancellationToken,
    guard: BarrierGuard,
) -> DispatchExit
where
    C: Connector,
    C::Conn: AsyncWrite + Unpin,
{
    let _guard = guard;
    tracing::info!(%identity, "dispatcher started");

    let exit = loop {
        let next = tokio::select! {
            biased;
            () = token.cancelled() => None,
            next = rx.recv() => Some(next),
        };
        let request = match next {
            None => break DispatchExit::Cancelled,
            Some(None) => break DispatchExit::ProducerGone,
            Some(Some(request)) => request,
        };
        tracing::debug!(%identity, request = %request.trim_end(), "application received");

        let span = tracing::info_span!("send", %identity);
        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => None,
            sent = send_request(&pool, &identity, &request, reuse).instrument(span) => Some(sent),
        };
        match outcome {
            None => break DispatchExit::Cancelled,
            Some(Err(e)) => break DispatchExit::CheckoutFailed(e),
            Some(Ok(())) => {}
        }
    };

    match &exit {
        DispatchExit::CheckoutFailed(e) => {
            tracing::warn!(
                monotonic_counter.dispatchers_stopped = 1_u64,
                %identity,
                error = %e,
                "application stopped"
            );
        }
        DispatchExit::ProducerGone | DispatchExit::Cancelled => {
            tracing::info!(
                monotonic_counter.dispatchers_stopped = 1_u64,
                %identity,
                reason = ?exit,
                "application stopped"
            );
        }
    }
    exit
}

/// Checks out a connection, writes `request` and disposes of the connection
/// according to `reuse`. Only the checkout can fail; a failed write is
/// logged and the connection dropped.
async fn send_request<C>(
    pool: &ConnectionPool<C>,
    identity: &str,
    request: &str,
    reuse: ConnectionReuse,
) -> Result<()>
where
    C: Connector,
    C::Conn: AsyncWrite + Unpin,
{
    let mut conn = pool.checkout().await?;

    match write_request(&mut conn, request).await {
        Ok(()) => {
            tracing::info!(monotonic_counter.messages_sent = 1_u64, %identity, "message sent");
            match reuse {
                ConnectionReuse::Discard => drop(conn),
                ConnectionReuse::Release => pool.release(conn),
            }
        }
        Err(e) => {
            tracing::debug!(%identity, error = %e, "write failed");
        }
    }
    Ok(())
}

/// Writes `request` followed by a newline and flushes.
pub(crate) async fn write_request<W>(conn: &mut W, request: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::with_capacity(request.len() + 1);
    frame.extend_from_slice(request.as_bytes());
    frame.push(b'\n');
    conn.write_all(&frame).await?;
    conn.flush().await
}
