//! Unbuffered, one-to-one message handoff between a producer and its
//! dispatcher.
//!
//! [`Sender::send`] does not return until the [`Receiver`] has taken the
//! message, so a pair never has more than one message in flight. Messages are
//! received in the order they were sent.
//!
//! Internally each message rides a capacity-1 [`mpsc`] channel together with
//! a [`oneshot`] that the receiver fires on pickup.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// The other half of the handoff is gone.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("handoff peer disconnected")]
pub struct Disconnected;

struct Delivery<T> {
    message: T,
    accepted: oneshot::Sender<()>,
}

/// Producer side of a handoff.
pub struct Sender<T> {
    tx: mpsc::Sender<Delivery<T>>,
}

/// Consumer side of a handoff.
pub struct Receiver<T> {
    rx: mpsc::Receiver<Delivery<T>>,
}

/// Creates a connected sender/receiver pair.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (Sender { tx }, Receiver { rx })
}

impl<T> Sender<T> {
    /// Hands `message` over and waits until the receiver has taken it.
    ///
    /// # Errors
    ///
    /// Returns [`Disconnected`] if the receiver was dropped before taking the
    /// message. The message is dropped with it.
    pub async fn send(&self, message: T) -> Result<(), Disconnected> {
        let (accepted, pickup) = oneshot::channel();
        self.tx
            .send(Delivery { message, accepted })
            .await
            .map_err(|_| Disconnected)?;
        pickup.await.map_err(|_| Disconnected)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Receiver<T> {
    /// Waits for the next message. Returns `None` once the sender is dropped.
    pub async fn recv(&mut self) -> Option<T> {
        let Delivery { message, accepted } = self.rx.recv().await?;
        // The sender may have given up waiting; the message is still ours.
        let _ = accepted.send(());
        Some(message)
    }
}

impl<T> core::fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sender").finish_non_exhaustive()
    }
}

impl<T> core::fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Receiver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn send_waits_for_pickup() {
        let (tx, mut rx) = channel();

        let send = tokio::spawn(async move { tx.send(7_u32).await });
        sleep(Duration::from_secs(5)).await;
        assert!(!send.is_finished());

        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(send.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn messages_arrive_in_send_order() {
        const K: u32 = 50;
        let (tx, mut rx) = channel();

        let producer = tokio::spawn(async move {
            for i in 0..K {
                tx.send(i).await.unwrap();
            }
        });

        let mut received = Vec::new();
        while let Some(i) = rx.recv().await {
            received.push(i);
        }
        producer.await.unwrap();

        assert_eq!(received, (0..K).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = channel::<&str>();
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.send("lost").await, Err(Disconnected));
    }

    #[tokio::test]
    async fn recv_ends_once_sender_is_gone() {
        let (tx, mut rx) = channel::<&str>();
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }
}
