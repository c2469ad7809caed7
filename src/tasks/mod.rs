//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: Purges expired entries from the shared cache region

mod cleanup;

pub use cleanup::spawn_cleanup_task;
