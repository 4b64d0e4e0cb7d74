use std::fmt;

use crate::dispatch::DispatchKey;

/// Which of the two registries an operation addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Instance,
    Device,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Instance => f.write_str("instance"),
            TableKind::Device => f.write_str("device"),
        }
    }
}

/// A broken caller contract. The registry is out of sync with the object
/// lifecycles the application drives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("{table} dispatch table already registered for key {key}")]
    AlreadyRegistered { table: TableKind, key: DispatchKey },

    #[error("no {table} dispatch table registered for key {key}")]
    NotRegistered { table: TableKind, key: DispatchKey },

    #[error("next layer did not provide {name} for key {key}")]
    MissingEntryPoint { key: DispatchKey, name: String },
}
