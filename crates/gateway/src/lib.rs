//! Host-bridge ingress.
//!
//! The platform side (broadcast receivers, connectivity callbacks, the
//! settings UI) talks to the pipeline through this small HTTP surface; the
//! core never links against platform code directly.

pub mod routes;
pub mod state;
