//! Introspection traits
//!
//! - [`Dumpable`]: how a value presents itself (leaf, collection, object, ...)
//! - [`Describe`]: which members a composite type exposes, with annotations

pub mod describe;
pub mod dumpable;

pub use describe::{Describe, Descriptor, MemberDescriptor, MemberValue, TypeDescriptor};
pub use dumpable::{Dumpable, Elements, Entries, Shape, TypeKey, short_type_name};
