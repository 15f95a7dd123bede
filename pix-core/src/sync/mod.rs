//! Remote persistence for views and items.
//!
//! [`SyncEngine`] turns commands into transport sends, holding them in a FIFO
//! until a session exists and answering queries from a [`LocalCache`] when it
//! can.

pub mod cache;
#[cfg(feature = "disk-cache")]
pub mod disk_cache;
pub mod engine;
pub mod memory_remote;
pub mod session;
pub mod transport;

pub use cache::{LocalCache, MemoryCache};
#[cfg(feature = "disk-cache")]
pub use disk_cache::{DiskCache, DiskCacheRoot};
pub use engine::{Reply, SyncEngine, SyncEngineBuilder, SyncMode};
pub use memory_remote::MemoryRemote;
pub use transport::{Completion, Responder, Transport, completion};
