//! Client-local durable caching for the collection stores.
//!
//! Storage is modelled as a plain string key/value store (`SlotStorage`),
//! with two backends:
//! - `CacheManager`: one JSON file per key in the cache directory
//! - `MemoryStorage`: in-process map for tests and `--no-cache` runs
//!
//! A `DurableSlot` binds a storage backend to one collection's key and
//! reads/writes `{"data": [...], "ts": <epoch ms>}` entries. Entries older
//! than the store's TTL (5 minutes by default) are re-fetched.

pub mod manager;
pub mod slot;

pub use manager::{CacheManager, MemoryStorage, SlotStorage};
pub use slot::{CacheEntry, DurableSlot};
