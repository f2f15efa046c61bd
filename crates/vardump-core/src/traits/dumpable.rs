// # Dumpable Trait
//
// Rust has no runtime reflection, so values describe themselves to the
// traversal engine by returning a `Shape`.
//
// ## Implementations
//
// - Standard library, chrono, serde_json, uuid and url types: `crate::impls`
// - Composite application types: implement `Describe` and wire them with
//   `dumpable_object!`
// - Enums and other leaf-like types: `dumpable_display!` / `dumpable_debug!`
//
// ## Usage
//
// ```rust
// use vardump_core::{Dumpable, Shape};
//
// struct Celsius(f64);
//
// impl Dumpable for Celsius {
//     fn shape(&self) -> Shape<'_> {
//         Shape::leaf(format!("{:.1}°C", self.0))
//     }
// }
// ```

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use super::describe::{Describe, Descriptor};

/// Identity of a Rust type
///
/// Equality and hashing use the `TypeId` only; the name is kept for
/// rendering headers and log messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key of type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId`
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths removed, generic arguments included
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strip module paths from every path segment of a type name
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(segment_start);
            }
            c if c.is_alphanumeric() || c == '_' => out.push(c),
            other => {
                out.push(other);
                segment_start = out.len();
            }
        }
    }

    out
}

/// Trait for values the dumper can render
///
/// Implementations must be read-only: `shape()` may be called several times
/// for the same value during one dump.
pub trait Dumpable: Any + 'static {
    /// How this value presents itself to the traversal engine
    fn shape(&self) -> Shape<'_>;

    /// Runtime type identity
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }
}

/// The structural view of a value
pub enum Shape<'a> {
    /// Absent value (`None`, JSON null, dropped weak reference)
    Null,

    /// Scalar rendered through its natural string form
    Leaf(Cow<'a, str>),

    /// The value exists but cannot be inspected right now
    ///
    /// Rendered as `<reason>`; used for locked mutexes and mutably borrowed
    /// cells.
    Unavailable(&'static str),

    /// A wrapper that renders exactly like its target (`Box`, `Some`, `Rc`)
    ///
    /// Shared pointers need nothing more: the pointee's address is the
    /// identity used for cycle detection.
    Transparent(&'a dyn Dumpable),

    /// A wrapper producing a temporary value (upgraded weak references)
    Owned(Box<dyn Dumpable>),

    /// A borrow guard over interior-mutable data (`RefCell`, `Mutex`)
    Guarded(Box<dyn Deref<Target = dyn Dumpable> + 'a>),

    /// Ordered sequence or set
    Seq(Elements<'a>),

    /// Key-value mapping
    Map(Entries<'a>),

    /// Composite value whose members come from its descriptor
    Object(fn() -> Descriptor),
}

impl<'a> Shape<'a> {
    /// Leaf from any string-like value
    pub fn leaf(text: impl Into<Cow<'a, str>>) -> Self {
        Shape::Leaf(text.into())
    }

    /// Leaf rendered with `Display`
    pub fn display(value: &impl fmt::Display) -> Self {
        Shape::Leaf(Cow::Owned(value.to_string()))
    }

    /// Leaf rendered with `Debug`
    pub fn debug(value: &impl fmt::Debug) -> Self {
        Shape::Leaf(Cow::Owned(format!("{:?}", value)))
    }

    /// Sequence over borrowed elements
    pub fn seq<T, I>(len: usize, items: I) -> Self
    where
        T: Dumpable,
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 'a,
    {
        Shape::Seq(Elements {
            len,
            iter: Box::new(items.into_iter().map(|item| item as &dyn Dumpable)),
        })
    }

    /// Mapping over borrowed entries
    pub fn map<K, V, I>(len: usize, entries: I) -> Self
    where
        K: Dumpable,
        V: Dumpable,
        I: IntoIterator<Item = (&'a K, &'a V)>,
        I::IntoIter: 'a,
    {
        Shape::Map(Entries {
            len,
            iter: Box::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k as &dyn Dumpable, v as &dyn Dumpable)),
            ),
        })
    }

    /// Composite described by `T`'s [`Describe`] impl
    pub fn object<T: Describe>() -> Self {
        Shape::Object(super::describe::erased::<T>)
    }

    /// Whether this shape is absent
    pub fn is_null(&self) -> bool {
        matches!(self, Shape::Null)
    }

    /// Whether this shape recurses (and therefore counts against depth)
    pub fn is_structural(&self) -> bool {
        matches!(self, Shape::Seq(_) | Shape::Map(_) | Shape::Object(_))
    }
}

/// Elements of a sequence
pub struct Elements<'a> {
    /// Total element count
    pub len: usize,
    /// Elements in iteration order
    pub iter: Box<dyn Iterator<Item = &'a dyn Dumpable> + 'a>,
}

/// Entries of a mapping
pub struct Entries<'a> {
    /// Total entry count
    pub len: usize,
    /// Entries in iteration order
    pub iter: Box<dyn Iterator<Item = (&'a dyn Dumpable, &'a dyn Dumpable)> + 'a>,
}

/// Implement [`Dumpable`] for types that implement [`Describe`]
///
/// ```rust
/// use vardump_core::{dumpable_object, Describe, TypeDescriptor};
///
/// struct Point { x: i32, y: i32 }
///
/// impl Describe for Point {
///     fn describe() -> TypeDescriptor<Self> {
///         TypeDescriptor::new()
///             .field("x", |p: &Point| &p.x)
///             .field("y", |p: &Point| &p.y)
///     }
/// }
///
/// dumpable_object!(Point);
/// ```
#[macro_export]
macro_rules! dumpable_object {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Dumpable for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::object::<Self>()
                }
            }
        )+
    };
}

/// Implement [`Dumpable`] as a leaf rendered with `Display`
#[macro_export]
macro_rules! dumpable_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Dumpable for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::display(self)
                }
            }
        )+
    };
}

/// Implement [`Dumpable`] as a leaf rendered with `Debug`
///
/// Fieldless enums render as their variant name.
#[macro_export]
macro_rules! dumpable_debug {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Dumpable for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::debug(self)
                }
            }
        )+
    };
}
