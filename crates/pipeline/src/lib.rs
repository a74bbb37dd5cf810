//! Event-to-notification pipeline.
//!
//! Takes classified telephony events from the host bridge through line
//! resolution, call-state dedup, formatting, and durable enqueue. Every
//! stage below the enqueue is best-effort and infallible; the only failure
//! path out of the pipeline is the database write itself.

pub mod callstate;
pub mod format;
pub mod passcode;
pub mod processor;

pub use processor::EventPipeline;
