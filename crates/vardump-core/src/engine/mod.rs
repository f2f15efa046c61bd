//! Object dumper
//!
//! The [`ObjectDumper`] is the facade owning the metadata registry, the
//! metadata cache and the default options. Each call walks the value graph
//! with fresh per-call state and writes through a
//! [`DumpWriter`](crate::writer::DumpWriter).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   dump(value)   ┌──────────────┐
//! │    caller    │────────────────▶│ ObjectDumper │
//! └──────────────┘                 └──────────────┘
//!                                         │
//!         ┌───────────────────────────────┼───────────────────────┐
//!         │                               │                       │
//!         ▼                               ▼                       ▼
//! ┌────────────────┐           ┌──────────────────┐      ┌──────────────┐
//! │ MetadataCache  │──build───▶│ MetadataRegistry │      │  DumpWriter  │
//! │ (per type)     │           │ (shadows, fmts)  │      │  (sink)      │
//! └────────────────┘           └──────────────────┘      └──────────────┘
//! ```
//!
//! ## Failure Model
//!
//! Nothing encountered while walking the graph propagates: cycles, depth,
//! failing getters and failing formatters all render inline markers. Only
//! sink failures and invalid options reach the caller.

mod traversal;

use std::fmt;
use std::io;

use once_cell::sync::OnceCell;
use tracing::{trace, warn};

use crate::annotation::DumpFn;
use crate::cache::MetadataCache;
use crate::config::DumpOptions;
use crate::error::{Error, Result};
use crate::registry::MetadataRegistry;
use crate::traits::{Describe, Dumpable, TypeDescriptor, TypeKey};
use crate::writer::IoSink;

use traversal::Traversal;

/// Reflection-driven object-graph dumper
///
/// ## Usage
///
/// ```rust
/// use vardump_core::{dumpable_object, Describe, ObjectDumper, TypeDescriptor};
///
/// struct Person { name: String, age: u32 }
///
/// impl Describe for Person {
///     fn describe() -> TypeDescriptor<Self> {
///         TypeDescriptor::new()
///             .field("name", |p: &Person| &p.name)
///             .field("age", |p: &Person| &p.age)
///     }
/// }
///
/// dumpable_object!(Person);
///
/// let dumper = ObjectDumper::new();
/// let person = Person { name: "Alice".into(), age: 30 };
/// assert_eq!(dumper.dump(&person), "Person\n  name: Alice\n  age: 30");
/// ```
///
/// ## Threading
///
/// `ObjectDumper` is `Send + Sync`. Concurrent dumps share the registry and
/// cache; per-call state is never shared.
pub struct ObjectDumper {
    /// Shadow metadata and custom formatters
    registry: MetadataRegistry,

    /// Resolved metadata per object type
    cache: MetadataCache,

    /// Defaults for every dump
    options: DumpOptions,
}

impl ObjectDumper {
    /// Create a dumper with default options
    pub fn new() -> Self {
        Self {
            registry: MetadataRegistry::new(),
            cache: MetadataCache::new(),
            options: DumpOptions::default(),
        }
    }

    /// Create a dumper with validated options
    pub fn with_options(options: DumpOptions) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            registry: MetadataRegistry::new(),
            cache: MetadataCache::new(),
            options,
        })
    }

    /// The metadata registry
    ///
    /// Read-only outside the crate. Register shadows and formatters through
    /// the dumper so cached metadata stays consistent.
    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// The metadata cache
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Default options
    pub fn options(&self) -> &DumpOptions {
        &self.options
    }

    /// Attach `D`'s annotations to `T`
    ///
    /// Cached metadata of `T` is evicted so the shadow applies to the next
    /// dump. Re-registering `T` replaces the previous shadow.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use vardump_core::{Annotation, Describe, ObjectDumper, TypeDescriptor};
    /// struct Credentials { user: String, secret: String }
    /// struct CredentialsShadow;
    ///
    /// impl Describe for CredentialsShadow {
    ///     fn describe() -> TypeDescriptor<Self> {
    ///         TypeDescriptor::new().annotate_member("secret", Annotation::new().masked())
    ///     }
    /// }
    ///
    /// let dumper = ObjectDumper::new();
    /// dumper.register_shadow::<Credentials, CredentialsShadow>();
    /// assert!(dumper.registry().has_shadow::<Credentials>());
    /// ```
    pub fn register_shadow<T: 'static, D: Describe>(&self) -> &Self {
        self.registry.register_shadow::<T, D>();
        self.cache.evict(TypeKey::of::<T>());
        self
    }

    /// Attach an ad-hoc descriptor's annotations to `T`
    pub fn register_shadow_descriptor<T: 'static, D>(&self, descriptor: TypeDescriptor<D>) -> &Self {
        self.registry.register_shadow_descriptor::<T, D>(descriptor);
        self.cache.evict(TypeKey::of::<T>());
        self
    }

    /// Register a custom formatter for values of type `T`
    pub fn register_formatter<T: Dumpable>(&self, formatter: DumpFn) -> &Self {
        self.registry.register_formatter::<T>(formatter);
        self
    }

    /// Render `value` with the default options
    pub fn dump(&self, value: &dyn Dumpable) -> String {
        self.dump_with_options(value, &self.options)
    }

    /// Render `value` with `options`
    ///
    /// Invalid options are logged and replaced by the dumper's defaults.
    pub fn dump_with_options(&self, value: &dyn Dumpable, options: &DumpOptions) -> String {
        let options = match options.validate() {
            Ok(()) => options,
            Err(err) => {
                warn!(error = %err, "Invalid dump options, using defaults");
                &self.options
            }
        };

        let mut out = String::new();
        if self.render(value, options, &mut out).is_err() {
            warn!("String sink rejected output");
        }
        out
    }

    /// Render `value` into a `fmt::Write` sink
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The whole rendering was written
    /// - `Err(Error::Sink)`: The sink refused a write
    pub fn dump_to<W: fmt::Write>(&self, value: &dyn Dumpable, sink: &mut W) -> Result<()> {
        self.render(value, &self.options, sink)?;
        Ok(())
    }

    /// Render `value` into an `io::Write` sink
    ///
    /// The sink is flushed on success.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The whole rendering was written and flushed
    /// - `Err(Error::Io)`: The first I/O error reported by the sink
    pub fn dump_to_io<W: io::Write>(&self, value: &dyn Dumpable, sink: W) -> Result<()> {
        let mut sink = IoSink::new(sink);
        let rendered = self.render(value, &self.options, &mut sink);

        if let Some(err) = sink.take_error() {
            return Err(Error::Io(err));
        }
        rendered?;

        sink.finish()?;
        Ok(())
    }

    fn render(&self, value: &dyn Dumpable, options: &DumpOptions, sink: &mut dyn fmt::Write) -> fmt::Result {
        trace!(root_type = value.type_key().name(), "Dumping value");
        Traversal::new(self, options, sink).run(value)
    }
}

impl Default for ObjectDumper {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceCell<ObjectDumper> = OnceCell::new();

/// Process-wide dumper, created with default options on first use
pub fn global() -> &'static ObjectDumper {
    GLOBAL.get_or_init(ObjectDumper::new)
}

/// Install a configured process-wide dumper
///
/// Must run before the first call to [`global`].
///
/// # Returns
///
/// - `Ok(&ObjectDumper)`: The installed dumper
/// - `Err(Error::Config)`: A process-wide dumper already exists
pub fn install_global(dumper: ObjectDumper) -> Result<&'static ObjectDumper> {
    GLOBAL
        .set(dumper)
        .map_err(|_| Error::config("global dumper already initialized"))?;
    Ok(global())
}

/// Dump any value with the process-wide dumper
pub trait DumpExt {
    /// Render `self` with [`global`]
    fn dump_text(&self) -> String;
}

impl<T: Dumpable> DumpExt for T {
    fn dump_text(&self) -> String {
        global().dump(self)
    }
}

impl DumpExt for dyn Dumpable {
    fn dump_text(&self) -> String {
        global().dump(self)
    }
}
