//! An embedded JSON document store.
//!
//! Records are arbitrary serde-serializable values keyed by string ids,
//! persisted through one of three interchangeable backends:
//! - **multi-file** (default): one `<id>.json` file per record
//! - **single-file**: one aggregate document holding every record
//! - **memory**: no filesystem at all
//!
//! Writes are crash-safe (temp file + atomic rename), the in-memory cache
//! always matches the durable state between operations, and every operation
//! comes in a blocking form plus a non-blocking `_async` form (feature
//! `async`, on by default).
//!
//! # Example
//!
//! ```rust
//! use shelf_json_store::{Store, StoreConfig};
//! use serde_json::json;
//!
//! let mut store = Store::open(StoreConfig::new("scratch").memory()).unwrap();
//! let id = store.save(&json!({"x": 56})).unwrap();
//! let value: serde_json::Value = store.get(&id).unwrap();
//! assert_eq!(value, json!({"x": 56}));
//! ```

mod backend;
mod cache;
mod fs_util;
pub mod memory;
pub mod multi_file;
pub mod single_file;
mod store;

pub use memory::MemoryBackend;
pub use multi_file::MultiFileBackend;
pub use single_file::SingleFileBackend;
pub use store::Store;

pub use shelf_core::{
    Backend, IdGenerator, IdStamp, Mode, Records, StoreConfig, StoreError, UuidGenerator,
    DEFAULT_ID_KEY, RECORD_EXT,
};

// Async support
#[cfg(feature = "async")]
mod async_store;

#[cfg(feature = "async")]
pub use shelf_core::AsyncBackend;
