//! Default adapters for the outbound ports.

pub mod cipher;
pub mod pool;
