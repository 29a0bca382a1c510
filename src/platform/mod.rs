//! Platform abstraction layer
//!
//! Handles the host-facing edges of a game:
//! - Input events (keyboard and touch, normalized to `Key`)
//! - Tick scheduling
//! - Storage (LocalStorage on web, in-memory elsewhere)

pub mod input;
pub mod scheduler;
pub mod storage;

pub use input::{InputLatch, Key};
pub use scheduler::{PendingTick, TickScheduler};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
