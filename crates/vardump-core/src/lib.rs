// # vardump-core
//
// Core library for rendering arbitrary object graphs as readable text.
//
// ## Architecture Overview
//
// - **Dumpable / Describe**: Traits through which values expose their shape
//   and composite types declare their members
// - **Annotation**: Declarative per-type and per-member configuration
// - **MetadataRegistry**: Shadow metadata and custom formatters for types
//   the application cannot annotate directly
// - **MetadataCache**: Resolved member lists, built once per type
// - **ObjectDumper**: Facade that walks the graph and drives the writer
// - **DumpWriter**: Indentation-aware output over any sink
//
// ## Design Principles
//
// 1. **Never fail the caller**: Cycles, depth, failing getters and failing
//    formatters render inline markers
// 2. **Bounded output**: Depth and length limits are the only brakes
// 3. **Explicit composition root**: Tests build isolated dumpers; the
//    process-wide instance is opt-in via `global()`
// 4. **Deterministic**: The same value and configuration always render the
//    same text

pub mod annotation;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod impls;
pub mod registry;
pub mod traits;
pub mod writer;

mod lock;

// Re-export core types for convenience
pub use annotation::{Annotation, DumpFn, Limit, Tristate};
pub use cache::{MemberMetadata, MetadataCache, TypeMetadata};
pub use config::{DumpOptions, TypeNameStyle};
pub use engine::{DumpExt, ObjectDumper, global, install_global};
pub use error::{Error, Result};
pub use registry::MetadataRegistry;
pub use traits::{Describe, Dumpable, MemberValue, Shape, TypeDescriptor, TypeKey};
pub use writer::{DumpWriter, IoSink};
