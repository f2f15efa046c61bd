//! Declarative dump annotations
//!
//! An [`Annotation`] configures how a type or a member is rendered: ordering,
//! null handling, recursion, length and depth limits, masking, formatting and
//! custom formatters. Annotations are plain immutable values attached to
//! descriptors at registration time.
//!
//! ## Precedence
//!
//! Tri-state flags resolve member-level first, then type-level, then the
//! system default ([`Tristate::Dump`]) through [`Tristate::or`]. Limits have
//! their own precedence, resolved by the traversal engine.

pub mod format;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::traits::{Dumpable, TypeKey};

/// Default placeholder for masked values
pub const DEFAULT_MASK: &str = "******";

/// Three-valued switch whose `Default` defers to the next level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tristate {
    /// Defer to the enclosing level
    #[default]
    Default,
    /// Explicitly on
    Dump,
    /// Explicitly off
    Skip,
}

impl Tristate {
    /// Return `self` unless it is `Default`, in which case `fallback`
    pub fn or(self, fallback: Tristate) -> Tristate {
        match self {
            Tristate::Default => fallback,
            explicit => explicit,
        }
    }

    /// Resolve against the system default, which is always `Dump`
    pub fn is_dump(self) -> bool {
        !matches!(self, Tristate::Skip)
    }
}

/// Length or depth limit
///
/// In configuration files a limit is a plain integer where `-1` means
/// unlimited. An unset limit is modelled as `Option::None` by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Limit {
    /// Explicitly unbounded; overrides any inherited limit
    Unlimited,
    /// At most this many characters, elements or levels
    At(usize),
}

impl Limit {
    /// The numeric bound, `None` when unlimited
    pub fn get(self) -> Option<usize> {
        match self {
            Limit::Unlimited => None,
            Limit::At(n) => Some(n),
        }
    }
}

impl TryFrom<i64> for Limit {
    type Error = crate::Error;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(Limit::Unlimited),
            n if n >= 0 => Ok(Limit::At(usize::try_from(n).unwrap_or(usize::MAX))),
            n => Err(crate::Error::config(format!(
                "limit must be -1 (unlimited) or non-negative, got {}",
                n
            ))),
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Unlimited => -1,
            Limit::At(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

type RenderFn = dyn Fn(&dyn Dumpable) -> anyhow::Result<String> + Send + Sync;

/// A custom `(value) -> string` formatter
///
/// Formatters built with [`DumpFn::new`] only accept values of their target
/// type; the engine skips them for other types. [`DumpFn::any`] accepts
/// every value.
#[derive(Clone)]
pub struct DumpFn {
    target: Option<TypeKey>,
    func: Arc<RenderFn>,
}

impl DumpFn {
    /// Formatter for values of type `T`
    ///
    /// # Example
    ///
    /// ```rust
    /// use vardump_core::DumpFn;
    ///
    /// let upper = DumpFn::new(|s: &String| Ok(s.to_uppercase()));
    /// ```
    pub fn new<T, F>(f: F) -> Self
    where
        T: Dumpable,
        F: Fn(&T) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        let func = move |value: &dyn Dumpable| -> anyhow::Result<String> {
            let any: &dyn Any = value;
            match any.downcast_ref::<T>() {
                Some(typed) => f(typed),
                None => Err(anyhow::anyhow!(
                    "formatter for {} received {}",
                    std::any::type_name::<T>(),
                    value.type_key().name()
                )),
            }
        };

        Self {
            target: Some(TypeKey::of::<T>()),
            func: Arc::new(func),
        }
    }

    /// Formatter accepting any value
    pub fn any<F>(f: F) -> Self
    where
        F: Fn(&dyn Dumpable) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            target: None,
            func: Arc::new(f),
        }
    }

    /// Whether this formatter applies to values of `key`
    pub fn accepts(&self, key: TypeKey) -> bool {
        self.target.is_none_or(|target| target == key)
    }

    /// Invoke the formatter
    pub fn render(&self, value: &dyn Dumpable) -> anyhow::Result<String> {
        (self.func)(value)
    }
}

impl fmt::Debug for DumpFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(key) => write!(f, "DumpFn({})", key.name()),
            None => f.write_str("DumpFn(any)"),
        }
    }
}

/// Dump configuration for a type or member
///
/// # Example
///
/// ```rust
/// use vardump_core::{Annotation, Tristate};
///
/// let secret = Annotation::new().order(-1).masked();
/// let optional = Annotation::new().include_nulls(Tristate::Skip).max_length(32);
/// ```
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Position among siblings; unordered members follow ordered ones
    pub order: Option<i32>,
    /// `false` removes the member from output
    pub include: bool,
    /// Emit members whose value is null
    pub include_nulls: Tristate,
    /// Descend into the value instead of rendering its summary
    pub recurse: Tristate,
    /// Enumerate collection elements instead of a count summary
    pub enumerate: Tristate,
    /// Character limit for leaves, element limit for collections
    pub max_length: Option<Limit>,
    /// Depth limit for the subtree rooted here
    pub max_depth: Option<Limit>,
    /// Replace the value with a placeholder
    pub mask: bool,
    /// Placeholder used when masking
    pub mask_value: Option<String>,
    /// Positional template applied to rendered values
    pub value_format: Option<String>,
    /// Positional template applied to member labels
    pub label_format: Option<String>,
    /// Custom formatter replacing default rendering
    pub dump_with: Option<DumpFn>,
    /// Render only this member of the value
    pub default_property: Option<String>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            order: None,
            include: true,
            include_nulls: Tristate::Default,
            recurse: Tristate::Default,
            enumerate: Tristate::Default,
            max_length: None,
            max_depth: None,
            mask: false,
            mask_value: None,
            value_format: None,
            label_format: None,
            dump_with: None,
            default_property: None,
        }
    }
}

impl Annotation {
    /// Create an annotation with every setting deferred
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the member order
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Remove the member from output
    pub fn skip(mut self) -> Self {
        self.include = false;
        self
    }

    /// Set null handling
    pub fn include_nulls(mut self, flag: Tristate) -> Self {
        self.include_nulls = flag;
        self
    }

    /// Set recursion
    pub fn recurse(mut self, flag: Tristate) -> Self {
        self.recurse = flag;
        self
    }

    /// Set collection enumeration
    pub fn enumerate(mut self, flag: Tristate) -> Self {
        self.enumerate = flag;
        self
    }

    /// Limit rendered length to `n` characters or elements
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(Limit::At(n));
        self
    }

    /// Lift any inherited length limit
    pub fn unlimited_length(mut self) -> Self {
        self.max_length = Some(Limit::Unlimited);
        self
    }

    /// Allow at most `n` further levels below this value
    pub fn max_depth(mut self, n: usize) -> Self {
        self.max_depth = Some(Limit::At(n));
        self
    }

    /// Lift any inherited depth limit
    pub fn unlimited_depth(mut self) -> Self {
        self.max_depth = Some(Limit::Unlimited);
        self
    }

    /// Mask the value with the default placeholder
    pub fn masked(mut self) -> Self {
        self.mask = true;
        self
    }

    /// Mask the value with `placeholder`
    pub fn mask_with(mut self, placeholder: impl Into<String>) -> Self {
        self.mask = true;
        self.mask_value = Some(placeholder.into());
        self
    }

    /// Set the value template
    pub fn value_format(mut self, template: impl Into<String>) -> Self {
        self.value_format = Some(template.into());
        self
    }

    /// Set the label template
    pub fn label_format(mut self, template: impl Into<String>) -> Self {
        self.label_format = Some(template.into());
        self
    }

    /// Render with a custom formatter
    pub fn dump_with(mut self, formatter: DumpFn) -> Self {
        self.dump_with = Some(formatter);
        self
    }

    /// Render only the named member
    pub fn default_property(mut self, name: impl Into<String>) -> Self {
        self.default_property = Some(name.into());
        self
    }

    /// `true` when nothing has been set
    ///
    /// Default annotations are treated as absent when falling back to
    /// shadow metadata.
    pub fn is_default(&self) -> bool {
        self.order.is_none()
            && self.include
            && self.include_nulls == Tristate::Default
            && self.recurse == Tristate::Default
            && self.enumerate == Tristate::Default
            && self.max_length.is_none()
            && self.max_depth.is_none()
            && !self.mask
            && self.mask_value.is_none()
            && self.value_format.is_none()
            && self.label_format.is_none()
            && self.dump_with.is_none()
            && self.default_property.is_none()
    }
}
