pub mod metrics;
pub mod panic;
pub mod tracing;
