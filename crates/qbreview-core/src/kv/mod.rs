//! Built-in storage backend and change notification shared by all backends.

mod memory;
mod notify;

pub use memory::MemoryStore;
pub use notify::{ChangeBus, StorageChange};
