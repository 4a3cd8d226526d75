//! Store configuration.
//!
//! A [`StoreConfig`] is immutable once handed to a store constructor. All
//! validation happens there; contradictory combinations are rejected with
//! [`StoreError::Initialization`] instead of being silently overridden.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StoreError;
use crate::id::{IdGenerator, UuidGenerator};

/// File extension shared by record files and single-file aggregates.
pub const RECORD_EXT: &str = "json";

/// Field name used when id stamping is enabled without a custom key.
pub const DEFAULT_ID_KEY: &str = "id";

/// How records are durably stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One file per record at `location/<id>.json`. The default.
    MultiFile,
    /// One aggregate file holding every record as a JSON object.
    SingleFile,
    /// No filesystem interaction; the cache is the only state.
    Memory,
}

/// Whether the record id is written into saved object values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdStamp {
    /// Values are persisted exactly as given.
    #[default]
    Off,
    /// The id is stamped under [`DEFAULT_ID_KEY`].
    DefaultKey,
    /// The id is stamped under the given field name.
    Key(String),
}

impl IdStamp {
    /// The stamp field name, if stamping is enabled.
    pub fn key(&self) -> Option<&str> {
        match self {
            IdStamp::Off => None,
            IdStamp::DefaultKey => Some(DEFAULT_ID_KEY),
            IdStamp::Key(key) => Some(key),
        }
    }
}

/// Configuration for a store, built with chainable setters.
///
/// ```rust
/// use shelf_core::{Mode, StoreConfig};
///
/// let config = StoreConfig::new("data/invoices")
///     .pretty(true)
///     .stamp_id();
/// assert_eq!(config.effective_mode().unwrap(), Mode::MultiFile);
/// ```
///
/// A location naming a `.json` file implies single-file mode:
///
/// ```rust
/// use shelf_core::{Mode, StoreConfig};
///
/// let config = StoreConfig::new("data/all.json");
/// assert_eq!(config.effective_mode().unwrap(), Mode::SingleFile);
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    location: PathBuf,
    mode: Option<Mode>,
    pretty: bool,
    id_stamp: IdStamp,
    id_generator: Arc<dyn IdGenerator>,
}

impl StoreConfig {
    /// A configuration for `location` with every option at its default:
    /// mode inferred from the location, compact output, no id stamping,
    /// random UUID ids.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        StoreConfig {
            location: location.into(),
            mode: None,
            pretty: false,
            id_stamp: IdStamp::Off,
            id_generator: Arc::new(UuidGenerator),
        }
    }

    /// Request a storage mode explicitly.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Shorthand for `.mode(Mode::SingleFile)`.
    pub fn single(self) -> Self {
        self.mode(Mode::SingleFile)
    }

    /// Shorthand for `.mode(Mode::Memory)`.
    pub fn memory(self) -> Self {
        self.mode(Mode::Memory)
    }

    /// Pretty-print persisted JSON with 2-space indentation.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Stamp each saved object with its id under [`DEFAULT_ID_KEY`].
    pub fn stamp_id(mut self) -> Self {
        self.id_stamp = IdStamp::DefaultKey;
        self
    }

    /// Stamp each saved object with its id under `key`.
    pub fn stamp_id_under(mut self, key: impl Into<String>) -> Self {
        self.id_stamp = IdStamp::Key(key.into());
        self
    }

    /// Substitute the id generator used by `save` without an explicit id.
    pub fn id_generator<G: IdGenerator + 'static>(mut self, generator: G) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    pub fn id_stamp(&self) -> &IdStamp {
        &self.id_stamp
    }

    pub fn generator(&self) -> Arc<dyn IdGenerator> {
        Arc::clone(&self.id_generator)
    }

    /// Resolve the storage mode, validating it against the location.
    ///
    /// A location whose extension is [`RECORD_EXT`] names a single-file
    /// aggregate; combining it with an explicit request for multi-file mode
    /// is an error rather than a silent override.
    pub fn effective_mode(&self) -> Result<Mode, StoreError> {
        let names_aggregate = self
            .location
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == RECORD_EXT);

        match (self.mode, names_aggregate) {
            (Some(Mode::MultiFile), true) => Err(StoreError::Initialization {
                message: format!(
                    "location '{}' names a .{} aggregate but multi-file mode was requested",
                    self.location.display(),
                    RECORD_EXT
                ),
            }),
            (Some(mode), _) => Ok(mode),
            (None, true) => Ok(Mode::SingleFile),
            (None, false) => Ok(Mode::MultiFile),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("location", &self.location)
            .field("mode", &self.mode)
            .field("pretty", &self.pretty)
            .field("id_stamp", &self.id_stamp)
            .finish_non_exhaustive()
    }
}
