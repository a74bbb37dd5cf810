//! Line registry — resolves hardware subscription ids to logical line slots.
//!
//! Telephony metadata lives with the host platform and may be denied or
//! empty at any time. Resolution therefore never fails: missing data
//! degrades to positional fallback lines so notification delivery is never
//! blocked on metadata availability.

pub mod registry;
pub mod source;

pub use registry::LineRegistry;
pub use source::{LineSubscription, StaticTelephonySource, TelephonyError, TelephonySource, UnavailableTelephonySource};
