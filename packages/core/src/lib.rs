//! Core shelf: the types every store backend shares.
//!
//! This layer defines the vocabulary of the store without committing to a
//! storage strategy:
//! - [`StoreError`]: the single error enum crossing every public boundary
//! - [`StoreConfig`] / [`Mode`] / [`IdStamp`]: validated configuration
//! - [`IdGenerator`]: pluggable id generation (UUID v4 by default)
//! - [`Backend`]: the persist/load/remove/enumerate seam implemented per
//!   storage mode
//!
//! Storage strategies and the `Store` facade live in `shelf-json-store`.
//!
//! # Example
//!
//! ```rust
//! use shelf_core::{Mode, StoreConfig};
//!
//! let config = StoreConfig::new("data/records").pretty(true);
//! assert_eq!(config.effective_mode().unwrap(), Mode::MultiFile);
//! ```

mod config;
mod error;
mod id;
mod traits;

pub use config::{IdStamp, Mode, StoreConfig, DEFAULT_ID_KEY, RECORD_EXT};
pub use error::StoreError;
pub use id::{IdGenerator, UuidGenerator};
pub use traits::{Backend, Records};

// Async support
#[cfg(feature = "async")]
mod async_traits;

#[cfg(feature = "async")]
pub use async_traits::AsyncBackend;
