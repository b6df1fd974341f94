//! The two tasks that make up one simulated client.
//!
//! A producer and a dispatcher are joined by a rendezvous [`handoff`]: the
//! producer formats a request on its schedule and blocks until the dispatcher
//! takes it; the dispatcher checks out a pooled connection, writes the request
//! and disposes of the connection.
//!
//! [`handoff`]: crate::handoff

mod dispatch;
mod producer;


pub use dispatch::{ConnectionReuse, DispatchExit, dispatch_loop};
pub use producer::{ProducerExit, Schedule, format_request, producer_loop};
