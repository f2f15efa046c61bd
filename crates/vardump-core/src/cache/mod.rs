//! Type metadata cache
//!
//! Discovering a type's members and merging their annotations happens once
//! per type; the result is shared by every later dump through an `Arc`.
//!
//! ## Thread Safety
//!
//! Lookups take a read lock. A miss takes the write lock, checks again and
//! builds while holding it, so concurrent first encounters of the same type
//! build exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::annotation::{Annotation, DumpFn};
use crate::lock::{read, write};
use crate::traits::describe::Getter;
use crate::traits::{Dumpable, MemberValue, TypeKey};

/// Resolved metadata of one type
pub struct TypeMetadata {
    key: TypeKey,
    annotation: Annotation,
    members: Vec<MemberMetadata>,
    summary: Option<DumpFn>,
    object: bool,
}

impl TypeMetadata {
    /// Metadata of a type without members
    pub(crate) fn leaf(key: TypeKey, annotation: Annotation) -> Self {
        Self {
            key,
            annotation,
            members: Vec::new(),
            summary: None,
            object: false,
        }
    }

    /// Metadata of a composite type
    ///
    /// Members are sorted by `order` ascending; members without an order
    /// follow, and ties keep declaration order.
    pub(crate) fn object(
        key: TypeKey,
        annotation: Annotation,
        mut members: Vec<MemberMetadata>,
        summary: Option<DumpFn>,
    ) -> Self {
        members.sort_by_key(|m| (m.annotation.order.is_none(), m.annotation.order, m.declared_at));
        Self {
            key,
            annotation,
            members,
            summary,
            object: true,
        }
    }

    /// The type this metadata belongs to
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Resolved type-level annotation
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Readable members in rendering order
    pub fn members(&self) -> &[MemberMetadata] {
        &self.members
    }

    /// Member by name
    pub fn member(&self, name: &str) -> Option<&MemberMetadata> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Whether the type was described as a composite
    pub fn is_object(&self) -> bool {
        self.object
    }

    pub(crate) fn summary(&self) -> Option<&DumpFn> {
        self.summary.as_ref()
    }
}

/// Resolved metadata of one member
pub struct MemberMetadata {
    name: String,
    annotation: Annotation,
    getter: Getter,
    declared_at: usize,
}

impl MemberMetadata {
    pub(crate) fn new(name: String, annotation: Annotation, getter: Getter, declared_at: usize) -> Self {
        Self {
            name,
            annotation,
            getter,
            declared_at,
        }
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved member annotation
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Position among readable members in declaration order
    pub fn declared_at(&self) -> usize {
        self.declared_at
    }

    /// Read this member from `owner`
    ///
    /// Getters may panic; callers isolate them.
    pub fn read<'a>(&self, owner: &'a dyn Dumpable) -> MemberValue<'a> {
        (self.getter)(owner)
    }
}

/// Cache of [`TypeMetadata`] keyed by type
#[derive(Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<TypeKey, Arc<TypeMetadata>>>,
    builds: AtomicUsize,
}

impl MetadataCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata for `key`, building it on first request
    ///
    /// # Parameters
    ///
    /// - `key`: Type identity
    /// - `build`: Invoked at most once per key while no entry exists
    ///
    /// # Returns
    ///
    /// The shared metadata; every caller observes the same `Arc`.
    pub fn get_or_build<F>(&self, key: TypeKey, build: F) -> Arc<TypeMetadata>
    where
        F: FnOnce() -> TypeMetadata,
    {
        if let Some(hit) = read(&self.entries).get(&key) {
            return Arc::clone(hit);
        }

        let mut entries = write(&self.entries);
        if let Some(hit) = entries.get(&key) {
            return Arc::clone(hit);
        }

        let metadata = Arc::new(build());
        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!(
            target_type = key.name(),
            members = metadata.members().len(),
            "Built type metadata"
        );

        entries.insert(key, Arc::clone(&metadata));
        metadata
    }

    /// Cached metadata for `key`, if built
    pub fn get(&self, key: TypeKey) -> Option<Arc<TypeMetadata>> {
        read(&self.entries).get(&key).cloned()
    }

    /// Drop the entry for `key`; returns whether one existed
    pub fn evict(&self, key: TypeKey) -> bool {
        let removed = write(&self.entries).remove(&key).is_some();
        if removed {
            debug!(target_type = key.name(), "Evicted type metadata");
        }
        removed
    }

    /// Number of cached types
    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of builds performed
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
