//! Id generation for records saved without an explicit id.

use uuid::Uuid;

/// Produces unique string identifiers.
///
/// Generated ids must be unique among live records and must be usable as a
/// file-name component (no path separators). The default is [`UuidGenerator`];
/// deterministic generators can be substituted through
/// [`StoreConfig::id_generator`](crate::StoreConfig::id_generator), which is
/// how tests pin ids.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 ids, hyphenated.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}
