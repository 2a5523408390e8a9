//! # SchemaRegistry — Caller-Owned Identity Resolution
//!
//! Redirect self-references resolve through an explicit registry value
//! owned by the caller. The registry is populated entirely while the
//! schema forest is being built (single-writer phase) and is read-only
//! during any comparison, so independent forests and concurrent
//! comparisons never observe each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SchemaError;
use crate::structure::Structure;

/// Stable identity of a schema structure, used as an ancestor or redirect
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaId(Uuid);

impl SchemaId {
    /// Generate a new random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SchemaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema:{}", self.0)
    }
}

/// Identity-to-structure map for redirect resolution.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    structures: HashMap<SchemaId, Structure>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a structure under an identity.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentity` when the identity is already taken — each
    /// identity may be registered at most once per registry.
    pub fn register(&mut self, id: SchemaId, structure: Structure) -> Result<(), SchemaError> {
        if self.structures.contains_key(&id) {
            return Err(SchemaError::DuplicateIdentity(id));
        }
        tracing::debug!(identity = %id, "registering schema structure");
        self.structures.insert(id, structure);
        Ok(())
    }

    /// Resolve an identity to its registered structure.
    ///
    /// # Errors
    ///
    /// `UnknownIdentity` when nothing is registered under the identity.
    pub fn resolve(&self, id: SchemaId) -> Result<&Structure, SchemaError> {
        self.structures
            .get(&id)
            .ok_or(SchemaError::UnknownIdentity(id))
    }

    /// Whether the identity is registered.
    pub fn contains(&self, id: SchemaId) -> bool {
        self.structures.contains_key(&id)
    }

    /// Number of registered structures.
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}
