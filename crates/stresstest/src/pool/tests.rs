use super::*;
use parking_lot::Mutex as PlMutex;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Clone, Default)]
struct MockConnector {
    dials: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
    stale: Arc<PlMutex<HashSet<usize>>>,
}

#[derive(Debug)]
struct MockConn {
    id: usize,
    drops: Arc<AtomicUsize>,
}

impl Drop for MockConn {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl MockConnector {
    fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    fn refuse(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    fn mark_stale(&self, id: usize) {
        self.stale.lock().insert(id);
    }
}

impl Connector for MockConnector {
    type Conn = MockConn;

    async fn connect(&self) -> io::Result<MockConn> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        }
        let id = self.dials.fetch_add(1, Ordering::SeqCst);
        Ok(MockConn {
            id,
            drops: Arc::clone(&self.drops),
        })
    }

    fn is_healthy(&self, conn: &MockConn) -> bool {
        !self.stale.lock().contains(&conn.id)
    }
}

async fn pool(min: usize, max: usize) -> (ConnectionPool<MockConnector>, MockConnector) {
    let connector = MockConnector::default();
    let pool = ConnectionPool::new(PoolConfig::new(min, max), connector.clone())
        .await
        .unwrap();
    (pool, connector)
}

#[tokio::test]
async fn new_dials_min_capacity_up_front() {
    let (pool, connector) = pool(3, 5).await;
    assert_eq!(connector.dials(), 3);
    assert_eq!(pool.idle_len(), 3);
    assert!(!pool.is_closed());
}

#[tokio::test]
async fn new_rejects_invalid_capacity_without_dialing() {
    let connector = MockConnector::default();
    let err = ConnectionPool::new(PoolConfig::new(3, 2), connector.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCapacity { min: 3, max: 2 }));
    assert_eq!(connector.dials(), 0);
}

#[tokio::test]
async fn new_fails_when_initial_dial_fails() {
    let connector = MockConnector::default();
    connector.refuse();
    let err = ConnectionPool::new(PoolConfig::new(1, 2), connector)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Dial(_)));
}

#[tokio::test]
async fn checkout_prefers_idle_connections() {
    let (pool, connector) = pool(2, 4).await;

    let a = pool.checkout().await.unwrap();
    let b = pool.checkout().await.unwrap();

    let mut ids = [a.id, b.id];
    ids.sort_unstable();
    assert_eq!(ids, [0, 1]);
    assert_eq!(connector.dials(), 2);
    assert_eq!(pool.idle_len(), 0);
}

#[tokio::test]
async fn checkout_dials_once_per_call_when_empty() {
    let (pool, connector) = pool(0, 4).await;

    let mut held = Vec::new();
    for expected in 1..=3 {
        held.push(pool.checkout().await.unwrap());
        assert_eq!(connector.dials(), expected);
    }
    assert_eq!(pool.idle_len(), 0);
}

#[tokio::test]
async fn checkout_returns_dial_error_directly() {
    let (pool, connector) = pool(0, 4).await;
    connector.refuse();

    let err = pool.checkout().await.unwrap_err();
    assert!(matches!(err, Error::Dial(ref e) if e.kind() == io::ErrorKind::ConnectionRefused));
    assert!(!pool.is_closed());
}

#[tokio::test]
async fn release_keeps_connection_below_capacity() {
    let (pool, connector) = pool(0, 2).await;

    let conn = pool.checkout().await.unwrap();
    pool.release(conn);

    assert_eq!(pool.idle_len(), 1);
    assert_eq!(connector.drops(), 0);

    let again = pool.checkout().await.unwrap();
    assert_eq!(again.id, 0);
    assert_eq!(connector.dials(), 1);
}

#[tokio::test]
async fn release_at_capacity_closes_connection() {
    let (pool, connector) = pool(0, 2).await;

    let a = pool.checkout().await.unwrap();
    let b = pool.checkout().await.unwrap();
    let c = pool.checkout().await.unwrap();
    assert_eq!(connector.dials(), 3);

    pool.release(a);
    pool.release(b);
    assert_eq!(pool.idle_len(), 2);
    assert_eq!(connector.drops(), 0);

    pool.release(c);
    assert_eq!(pool.idle_len(), 2);
    assert_eq!(connector.drops(), 1);
}

#[tokio::test]
async fn close_drains_idle_and_refuses_checkout() {
    let (pool, connector) = pool(3, 5).await;

    pool.close();

    assert!(pool.is_closed());
    assert_eq!(pool.idle_len(), 0);
    assert_eq!(connector.drops(), 3);

    for _ in 0..3 {
        assert!(pool.checkout().await.unwrap_err().is_pool_closed());
    }
    assert_eq!(connector.dials(), 3);
}

#[tokio::test]
async fn close_leaves_checked_out_connections_alone() {
    let (pool, connector) = pool(2, 5).await;

    let held = pool.checkout().await.unwrap();
    pool.close();
    assert_eq!(connector.drops(), 1);

    // Releasing into a closed pool closes the connection.
    pool.release(held);
    assert_eq!(connector.drops(), 2);
    assert_eq!(pool.idle_len(), 0);
}

#[tokio::test]
async fn close_is_idempotent() {
    let (pool, connector) = pool(1, 1).await;
    pool.close();
    pool.close();
    assert_eq!(connector.drops(), 1);
    assert!(pool.is_closed());
}

#[tokio::test]
async fn idle_connections_are_not_validated_by_default() {
    let (pool, connector) = pool(1, 2).await;
    connector.mark_stale(0);

    let conn = pool.checkout().await.unwrap();
    assert_eq!(conn.id, 0);
    assert_eq!(connector.dials(), 1);
}

#[tokio::test]
async fn validate_idle_skips_unhealthy_connections() {
    let connector = MockConnector::default();
    let config = PoolConfig::new(2, 4).with_validate_idle(true);
    let pool = ConnectionPool::new(config, connector.clone()).await.unwrap();
    connector.mark_stale(0);

    let conn = pool.checkout().await.unwrap();
    assert_eq!(conn.id, 1);
    assert_eq!(connector.drops(), 1);

    drop(conn);
    let fresh = pool.checkout().await.unwrap();
    assert_eq!(fresh.id, 2);
    assert_eq!(connector.dials(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkout_release_never_exceeds_capacity() {
    const TASKS: usize = 16;
    const ROUNDS: usize = 100;
    const MAX: usize = 4;

    let connector = MockConnector::default();
    let pool = Arc::new(
        ConnectionPool::new(PoolConfig::new(2, MAX), connector.clone())
            .await
            .unwrap(),
    );

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                for _ in 0..ROUNDS {
                    let conn = pool.checkout().await.unwrap();
                    tokio::task::yield_now().await;
                    pool.release(conn);
                    assert!(pool.idle_len() <= MAX);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let idle = pool.idle_len();
    assert!(idle <= MAX);
    // Every dialed connection is either idle or closed.
    assert_eq!(connector.dials(), connector.drops() + idle);

    pool.close();
    assert_eq!(connector.dials(), connector.drops());
}
