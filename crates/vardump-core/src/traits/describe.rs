// # Describe Trait
//
// Composite types list their dumpable members through a `TypeDescriptor`:
// the type-level annotation plus an ordered list of (name, annotation,
// getter). The same builder also serves as a shadow descriptor, where only
// names and annotations matter.
//
// ## Usage
//
// ```rust,ignore
// impl Describe for Account {
//     fn describe() -> TypeDescriptor<Self> {
//         TypeDescriptor::new()
//             .annotate(Annotation::new().max_depth(3))
//             .field("owner", |a: &Account| &a.owner)
//             .field_with("pin", Annotation::new().masked(), |a: &Account| &a.pin)
//             .computed("balance", |a: &Account| a.balance())
//     }
// }
// ```

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::annotation::{Annotation, DumpFn};

use super::dumpable::Dumpable;

/// Trait for types that declare their dumpable members
///
/// Declaration order is the order of builder calls.
pub trait Describe: Sized + 'static {
    /// Build the descriptor for `Self`
    fn describe() -> TypeDescriptor<Self>;
}

/// Result of reading one member
pub enum MemberValue<'a> {
    /// A borrowed field
    Borrowed(&'a dyn Dumpable),
    /// A computed value
    Owned(Box<dyn Dumpable>),
    /// The getter failed; the message is rendered inline
    Failed(String),
}

pub(crate) type Getter = Arc<dyn for<'a> Fn(&'a dyn Dumpable) -> MemberValue<'a> + Send + Sync>;

pub(crate) fn erase_getter<F>(f: F) -> Getter
where
    F: for<'a> Fn(&'a dyn Dumpable) -> MemberValue<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn mismatch<T>(value: &dyn Dumpable) -> String {
    format!(
        "descriptor of {} applied to {}",
        std::any::type_name::<T>(),
        value.type_key().name()
    )
}

/// Typed descriptor builder for `T`
pub struct TypeDescriptor<T> {
    annotation: Annotation,
    members: Vec<MemberDescriptor>,
    summary: Option<DumpFn>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Default for TypeDescriptor<T> {
    fn default() -> Self {
        Self {
            annotation: Annotation::default(),
            members: Vec::new(),
            summary: None,
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> TypeDescriptor<T> {
    /// Create an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type-level annotation
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Add a borrowed field with no annotation
    pub fn field<V, F>(self, name: impl Into<String>, get: F) -> Self
    where
        V: Dumpable,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        self.field_with(name, Annotation::default(), get)
    }

    /// Add a borrowed field
    pub fn field_with<V, F>(mut self, name: impl Into<String>, annotation: Annotation, get: F) -> Self
    where
        V: Dumpable,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        let getter = erase_getter(move |value| {
            let any: &dyn Any = value;
            match any.downcast_ref::<T>() {
                Some(typed) => MemberValue::Borrowed(get(typed)),
                None => MemberValue::Failed(mismatch::<T>(value)),
            }
        });

        self.members.push(MemberDescriptor {
            name: name.into(),
            annotation,
            getter: Some(getter),
        });
        self
    }

    /// Add a computed member with no annotation
    pub fn computed<V, F>(self, name: impl Into<String>, get: F) -> Self
    where
        V: Dumpable,
        F: Fn(&T) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.computed_with(name, Annotation::default(), get)
    }

    /// Add a computed member whose getter may fail
    pub fn computed_with<V, F>(
        mut self,
        name: impl Into<String>,
        annotation: Annotation,
        get: F,
    ) -> Self
    where
        V: Dumpable,
        F: Fn(&T) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        let getter = erase_getter(move |value| {
            let any: &dyn Any = value;
            match any.downcast_ref::<T>() {
                Some(typed) => match get(typed) {
                    Ok(computed) => MemberValue::Owned(Box::new(computed)),
                    Err(err) => MemberValue::Failed(format!("{:#}", err)),
                },
                None => MemberValue::Failed(mismatch::<T>(value)),
            }
        });

        self.members.push(MemberDescriptor {
            name: name.into(),
            annotation,
            getter: Some(getter),
        });
        self
    }

    /// Attach an annotation to a member by name
    ///
    /// Replaces the annotation of an already declared member. Otherwise an
    /// annotation-only entry is recorded, which is how shadow descriptors
    /// describe members of types they cannot read.
    pub fn annotate_member(mut self, name: impl Into<String>, annotation: Annotation) -> Self {
        let name = name.into();
        match self.members.iter_mut().find(|m| m.name == name) {
            Some(member) => member.annotation = annotation,
            None => self.members.push(MemberDescriptor {
                name,
                annotation,
                getter: None,
            }),
        }
        self
    }
}

impl<T: Dumpable> TypeDescriptor<T> {
    /// Default string form used when recursion is skipped
    ///
    /// Without a summary the short type name is used.
    pub fn summary<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.summary = Some(DumpFn::new(move |value: &T| Ok(f(value))));
        self
    }
}

/// Type-erased descriptor
pub struct Descriptor {
    annotation: Annotation,
    members: Vec<MemberDescriptor>,
    summary: Option<DumpFn>,
}

impl Descriptor {
    /// Type-level annotation
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Members in declaration order, including annotation-only entries
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Annotation declared for `name`, if any
    pub fn member_annotation(&self, name: &str) -> Option<&Annotation> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.annotation)
    }

    pub(crate) fn summary(&self) -> Option<&DumpFn> {
        self.summary.as_ref()
    }
}

impl<T> From<TypeDescriptor<T>> for Descriptor {
    fn from(descriptor: TypeDescriptor<T>) -> Self {
        Self {
            annotation: descriptor.annotation,
            members: descriptor.members,
            summary: descriptor.summary,
        }
    }
}

/// Erased descriptor of `T`, used as the `Shape::Object` builder
pub(crate) fn erased<T: Describe>() -> Descriptor {
    T::describe().into()
}

/// One declared member
#[derive(Clone)]
pub struct MemberDescriptor {
    name: String,
    annotation: Annotation,
    getter: Option<Getter>,
}

impl MemberDescriptor {
    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared annotation
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Whether this member can be read
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub(crate) fn getter(&self) -> Option<&Getter> {
        self.getter.as_ref()
    }
}
