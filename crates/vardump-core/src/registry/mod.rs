//! Metadata registry
//!
//! The registry resolves a type's effective annotations from its own
//! descriptor and from shadow descriptors registered for types the
//! application cannot annotate directly. It also holds the per-type custom
//! formatter table.
//!
//! ## Registration
//!
//! Shadows and formatters are registered through
//! [`ObjectDumper`](crate::ObjectDumper), which also evicts cached metadata
//! of the target type. The registry itself only answers lookups outside the
//! crate.
//!
//! ## Precedence
//!
//! A type's own annotation wins when it sets anything; otherwise the shadow
//! annotation applies; otherwise everything is dumped with defaults. Member
//! annotations fall back the same way, matched by member name.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::annotation::{Annotation, DumpFn};
use crate::cache::{MemberMetadata, TypeMetadata};
use crate::lock::{read, write};
use crate::traits::{Describe, Descriptor, Dumpable, TypeDescriptor, TypeKey};

/// Registry of shadow descriptors and custom formatters
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// lookups and exclusive registration.
#[derive(Default)]
pub struct MetadataRegistry {
    /// Shadow descriptors keyed by target type
    shadows: RwLock<HashMap<TypeKey, Arc<Descriptor>>>,

    /// Custom formatters keyed by target type
    formatters: RwLock<HashMap<TypeKey, DumpFn>>,
}

impl MetadataRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `D`'s annotations to `T`
    ///
    /// Re-registering `T` replaces the previous shadow.
    pub(crate) fn register_shadow<T: 'static, D: Describe>(&self) -> &Self {
        self.register_shadow_descriptor::<T, D>(D::describe())
    }

    /// Attach an ad-hoc descriptor's annotations to `T`
    pub(crate) fn register_shadow_descriptor<T: 'static, D>(&self, descriptor: TypeDescriptor<D>) -> &Self {
        let key = TypeKey::of::<T>();
        let previous = write(&self.shadows).insert(key, Arc::new(descriptor.into()));

        debug!(
            target_type = key.name(),
            replaced = previous.is_some(),
            "Registered shadow metadata"
        );
        self
    }

    /// Register a custom formatter for values of type `T`
    ///
    /// Re-registering `T` replaces the previous formatter.
    pub(crate) fn register_formatter<T: Dumpable>(&self, formatter: DumpFn) -> &Self {
        let key = TypeKey::of::<T>();
        let previous = write(&self.formatters).insert(key, formatter);

        debug!(
            target_type = key.name(),
            replaced = previous.is_some(),
            "Registered custom formatter"
        );
        self
    }

    /// Check if a shadow is registered for `T`
    pub fn has_shadow<T: 'static>(&self) -> bool {
        self.has_shadow_for(TypeKey::of::<T>())
    }

    /// Check if a shadow is registered for `key`
    pub fn has_shadow_for(&self, key: TypeKey) -> bool {
        read(&self.shadows).contains_key(&key)
    }

    /// Number of registered shadows
    pub fn shadow_count(&self) -> usize {
        read(&self.shadows).len()
    }

    /// Number of registered formatters
    pub fn formatter_count(&self) -> usize {
        read(&self.formatters).len()
    }

    /// Custom formatter registered for `key`
    pub fn formatter_for(&self, key: TypeKey) -> Option<DumpFn> {
        read(&self.formatters).get(&key).cloned()
    }

    fn shadow_for(&self, key: TypeKey) -> Option<Arc<Descriptor>> {
        read(&self.shadows).get(&key).cloned()
    }

    /// Effective type-level annotation
    ///
    /// `own` is the type's own descriptor, if it has one. Never fails.
    pub fn resolve_type_annotation(&self, key: TypeKey, own: Option<&Descriptor>) -> Annotation {
        let shadow = self.shadow_for(key);
        pick(
            own.map(Descriptor::annotation),
            shadow.as_deref().map(Descriptor::annotation),
        )
    }

    /// Effective annotations of the readable members of `own`
    ///
    /// Returned in declaration order.
    pub fn resolve_member_annotations(&self, key: TypeKey, own: &Descriptor) -> Vec<(String, Annotation)> {
        let shadow = self.shadow_for(key);
        member_annotations(own, shadow.as_deref())
    }

    /// Build the full metadata of a type
    ///
    /// Called by the cache on first encounter of an object type.
    pub fn resolve(&self, key: TypeKey, own: Option<Descriptor>) -> TypeMetadata {
        let shadow = self.shadow_for(key);
        let annotation = pick(
            own.as_ref().map(Descriptor::annotation),
            shadow.as_deref().map(Descriptor::annotation),
        );

        let Some(own) = own else {
            return TypeMetadata::leaf(key, annotation);
        };

        let annotations = member_annotations(&own, shadow.as_deref());
        let getters = own.members().iter().filter_map(|m| m.getter().cloned());

        let members = annotations
            .into_iter()
            .zip(getters)
            .enumerate()
            .map(|(declared_at, ((name, annotation), getter))| {
                MemberMetadata::new(name, annotation, getter, declared_at)
            })
            .collect();

        TypeMetadata::object(key, annotation, members, own.summary().cloned())
    }
}

fn pick(own: Option<&Annotation>, shadow: Option<&Annotation>) -> Annotation {
    match own {
        Some(annotation) if !annotation.is_default() => annotation.clone(),
        _ => shadow.cloned().unwrap_or_default(),
    }
}

fn member_annotations(own: &Descriptor, shadow: Option<&Descriptor>) -> Vec<(String, Annotation)> {
    own.members()
        .iter()
        .filter(|member| member.is_readable())
        .map(|member| {
            let fallback = shadow.and_then(|s| s.member_annotation(member.name()));
            (
                member.name().to_string(),
                pick(Some(member.annotation()), fallback),
            )
        })
        .collect()
}
