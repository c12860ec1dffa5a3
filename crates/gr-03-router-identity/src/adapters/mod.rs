//! Adapters: on-disk identity files and the in-memory key manager.

pub mod key_manager;
pub mod storage;
