//! Durable dispatch queue.
//!
//! Jobs are persisted in SQLite the moment an event is classified and stay
//! there until terminal, so a process restart never loses a pending
//! notification. The worker gates attempts on network availability, retries
//! with linear backoff, and abandons jobs on fatal outcomes or at the
//! attempt ceiling.

pub mod network;
pub mod store;
pub mod worker;

pub use network::{NetworkHandle, NetworkWatch};
pub use store::JobStore;
pub use worker::DispatchWorker;
