//! Shared tracing setup for the pingwatch binaries.

mod tracing;

pub use self::tracing::{init, init_tracing};
