//! Recursive graph walk for one dump call
//!
//! A `Traversal` owns the per-call state: the writer, the set of value
//! identities on the current path and nothing else. Limits and depth travel
//! down the call stack as arguments.
//!
//! ## Per-node order
//!
//! 1. Wrappers (`Box`, `Some`, `Rc`, guards) are peeled
//! 2. Null and unavailable values render their marker
//! 3. Masked values render the mask
//! 4. Identity already on the path renders `<cycle detected>`
//! 5. Structural values below the depth cap render `<max depth reached>`
//! 6. Custom formatters replace default rendering
//! 7. Leaves, collections and objects render themselves

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::annotation::{format, Annotation, DumpFn, Limit, Tristate};
use crate::cache::{MemberMetadata, TypeMetadata};
use crate::config::{DumpOptions, TypeNameStyle};
use crate::traits::{Descriptor, Dumpable, Elements, Entries, MemberValue, Shape, TypeKey};
use crate::writer::DumpWriter;

use super::ObjectDumper;

pub(crate) const NULL_MARKER: &str = "<null>";
pub(crate) const CYCLE_MARKER: &str = "<cycle detected>";
pub(crate) const DEPTH_MARKER: &str = "<max depth reached>";
pub(crate) const TRUNCATION_SUFFIX: &str = "...";

/// Identity of a structural value on the current path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Identity {
    address: usize,
    type_id: TypeId,
}

impl Identity {
    /// Zero-sized values share addresses and have no identity
    fn of(value: &dyn Dumpable) -> Option<Self> {
        if std::mem::size_of_val(value) == 0 {
            return None;
        }
        Some(Self {
            address: value as *const dyn Dumpable as *const () as usize,
            type_id: value.type_key().id(),
        })
    }
}

/// Limits in force at a node
///
/// `depth` is an absolute cap: a structural node at depth `d` expands only
/// while `d <= depth`. `length` caps characters of leaves and elements of
/// collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limits {
    depth: Option<usize>,
    length: Option<usize>,
}

impl Limits {
    fn from_options(options: &DumpOptions) -> Self {
        Self {
            depth: options.max_depth.get(),
            length: options.max_length.get(),
        }
    }

    /// Limits for a node at `depth`
    ///
    /// Returns the limits applying to the node itself and the limits its
    /// children inherit. An explicit member limit overrides; a type-level
    /// `At(n)` only tightens; a type-level `Unlimited` lifts the limit.
    fn refine(self, member: Option<&Annotation>, own: &Annotation, depth: usize) -> (Limits, Limits) {
        let depth_cap = match member.and_then(|m| m.max_depth) {
            Some(Limit::At(k)) => Some(depth.saturating_add(k)),
            Some(Limit::Unlimited) => None,
            None => match own.max_depth {
                Some(Limit::At(k)) => {
                    let cap = depth.saturating_add(k);
                    Some(self.depth.map_or(cap, |inherited| inherited.min(cap)))
                }
                Some(Limit::Unlimited) => None,
                None => self.depth,
            },
        };

        let inherited_length = match own.max_length {
            Some(Limit::At(k)) => Some(self.length.map_or(k, |inherited| inherited.min(k))),
            Some(Limit::Unlimited) => None,
            None => self.length,
        };
        let length = match member.and_then(|m| m.max_length) {
            Some(limit) => limit.get(),
            None => inherited_length,
        };

        (
            Limits {
                depth: depth_cap,
                length,
            },
            Limits {
                depth: depth_cap,
                length: inherited_length,
            },
        )
    }

    fn expands(&self, depth: usize) -> bool {
        self.depth.is_none_or(|cap| depth <= cap)
    }
}

/// State of one dump call
pub(crate) struct Traversal<'d, 'w> {
    dumper: &'d ObjectDumper,
    options: &'d DumpOptions,
    writer: DumpWriter<'w>,
    path: HashSet<Identity>,
}

impl<'d, 'w> Traversal<'d, 'w> {
    pub(crate) fn new(dumper: &'d ObjectDumper, options: &'d DumpOptions, sink: &'w mut dyn fmt::Write) -> Self {
        Self {
            dumper,
            options,
            writer: DumpWriter::new(sink, options.indent_width),
            path: HashSet::new(),
        }
    }

    /// Render `root` at depth 0
    pub(crate) fn run(mut self, root: &dyn Dumpable) -> fmt::Result {
        let limits = Limits::from_options(self.options);
        self.visit(root, None, 0, limits)
    }

    fn visit(&mut self, value: &dyn Dumpable, member: Option<&Annotation>, depth: usize, limits: Limits) -> fmt::Result {
        let shape = match shape_of(value) {
            Ok(shape) => shape,
            Err(message) => return self.write_error(&message),
        };

        match shape {
            Shape::Transparent(inner) => self.visit(inner, member, depth, limits),
            Shape::Owned(boxed) => self.visit(&*boxed, member, depth, limits),
            Shape::Guarded(guard) => self.visit(&**guard, member, depth, limits),
            Shape::Null => self.writer.write_value(NULL_MARKER),
            Shape::Unavailable(reason) => self.writer.write_value(&format!("<{}>", reason)),
            shape => self.render(value, shape, member, depth, limits),
        }
    }

    fn render(
        &mut self,
        value: &dyn Dumpable,
        shape: Shape<'_>,
        member: Option<&Annotation>,
        depth: usize,
        limits: Limits,
    ) -> fmt::Result {
        let key = value.type_key();

        let metadata = match &shape {
            Shape::Object(describe) => match self.object_metadata(key, *describe) {
                Ok(metadata) => Some(metadata),
                Err(message) => return self.write_error(&message),
            },
            _ => None,
        };
        let type_annotation = match &metadata {
            Some(metadata) => Cow::Borrowed(metadata.annotation()),
            None => Cow::Owned(self.dumper.registry().resolve_type_annotation(key, None)),
        };
        let own = type_annotation.as_ref();

        if member.is_some_and(|m| m.mask) || own.mask {
            let mask = member
                .and_then(|m| m.mask_value.as_deref())
                .or(own.mask_value.as_deref())
                .unwrap_or(&self.options.mask_value);
            return self.writer.write_value(mask);
        }

        let identity = if shape.is_structural() {
            Identity::of(value)
        } else {
            None
        };
        if identity.is_some_and(|id| self.path.contains(&id)) {
            return self.writer.write_value(CYCLE_MARKER);
        }

        let (here, children) = limits.refine(member, own, depth);
        if shape.is_structural() && !here.expands(depth) {
            return self.writer.write_value(DEPTH_MARKER);
        }

        let value_format = member
            .and_then(|m| m.value_format.as_deref())
            .or(own.value_format.as_deref());

        if let Some(formatter) = self.formatter(key, member, own) {
            return match isolate(|| formatter.render(value)) {
                Ok(Ok(text)) => self.write_leaf(&text, value_format, here.length),
                Ok(Err(err)) => {
                    warn!(target_type = key.name(), error = %format!("{:#}", err), "Custom formatter failed");
                    self.write_error(&format!("{:#}", err))
                }
                Err(message) => {
                    warn!(target_type = key.name(), panic = %message, "Custom formatter panicked");
                    self.write_error(&format!("panic: {}", message))
                }
            };
        }

        let recurse = member.map_or(Tristate::Default, |m| m.recurse).or(own.recurse);

        match shape {
            Shape::Leaf(text) => self.write_leaf(&text, value_format, here.length),
            Shape::Seq(elements) => {
                let enumerate = member.map_or(Tristate::Default, |m| m.enumerate).or(own.enumerate);
                if !recurse.is_dump() || !enumerate.is_dump() {
                    return self.write_count(key, elements.len);
                }
                self.on_path(identity, |this| this.write_elements(key, elements, depth, here, children))
            }
            Shape::Map(entries) => {
                let enumerate = member.map_or(Tristate::Default, |m| m.enumerate).or(own.enumerate);
                if !recurse.is_dump() || !enumerate.is_dump() {
                    return self.write_count(key, entries.len);
                }
                self.on_path(identity, |this| this.write_entries(key, entries, depth, here, children))
            }
            Shape::Object(_) => {
                let Some(metadata) = metadata.as_deref() else {
                    return Ok(());
                };
                if !recurse.is_dump() || metadata.members().is_empty() {
                    return self.write_summary(value, metadata, value_format, here.length);
                }

                let default_property = member
                    .and_then(|m| m.default_property.as_deref())
                    .or(own.default_property.as_deref());

                self.on_path(identity, |this| match default_property {
                    Some(name) => this.write_default_property(value, metadata, name, depth, children),
                    None => this.write_members(value, metadata, depth, children),
                })
            }
            // Peeled in `visit`
            Shape::Null
            | Shape::Unavailable(_)
            | Shape::Transparent(_)
            | Shape::Owned(_)
            | Shape::Guarded(_) => Ok(()),
        }
    }

    fn on_path<F>(&mut self, identity: Option<Identity>, f: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        if let Some(id) = identity {
            self.path.insert(id);
        }
        let result = f(self);
        if let Some(id) = identity {
            self.path.remove(&id);
        }
        result
    }

    fn object_metadata(&self, key: TypeKey, describe: fn() -> Descriptor) -> Result<Arc<TypeMetadata>, String> {
        let registry = self.dumper.registry();
        isolate(|| {
            self.dumper
                .cache()
                .get_or_build(key, || registry.resolve(key, Some(describe())))
        })
        .map_err(|message| {
            warn!(target_type = key.name(), panic = %message, "Describing type panicked");
            format!("panic: {}", message)
        })
    }

    /// First formatter accepting `key`: member, registry, then type
    fn formatter(&self, key: TypeKey, member: Option<&Annotation>, own: &Annotation) -> Option<DumpFn> {
        if let Some(formatter) = member.and_then(|m| m.dump_with.as_ref()).filter(|f| f.accepts(key)) {
            return Some(formatter.clone());
        }
        if let Some(formatter) = self.dumper.registry().formatter_for(key).filter(|f| f.accepts(key)) {
            return Some(formatter);
        }
        own.dump_with.as_ref().filter(|f| f.accepts(key)).cloned()
    }

    fn type_name(&self, key: TypeKey) -> Cow<'static, str> {
        match self.options.type_names {
            TypeNameStyle::Short => Cow::Owned(key.short_name()),
            TypeNameStyle::Full => Cow::Borrowed(key.name()),
        }
    }

    fn write_error(&mut self, message: &str) -> fmt::Result {
        self.writer.write_value(&format!("<error: {}>", message))
    }

    fn write_leaf(&mut self, text: &str, value_format: Option<&str>, length: Option<usize>) -> fmt::Result {
        let formatted = match value_format {
            Some(template) => match format::apply(template, &[text]) {
                Ok(formatted) => Cow::Owned(formatted),
                Err(err) => {
                    warn!(template, error = %err, "Value format failed");
                    return self.write_error(&err.to_string());
                }
            },
            None => Cow::Borrowed(text),
        };
        self.writer.write_value(&truncate(&formatted, length))
    }

    fn write_count(&mut self, key: TypeKey, len: usize) -> fmt::Result {
        let header = format!("{} (count: {})", self.type_name(key), len);
        self.writer.write_value(&header)
    }

    fn write_summary(
        &mut self,
        value: &dyn Dumpable,
        metadata: &TypeMetadata,
        value_format: Option<&str>,
        length: Option<usize>,
    ) -> fmt::Result {
        let text = match metadata.summary() {
            Some(summary) => match isolate(|| summary.render(value)) {
                Ok(Ok(text)) => text,
                Ok(Err(err)) => return self.write_error(&format!("{:#}", err)),
                Err(message) => return self.write_error(&format!("panic: {}", message)),
            },
            None => self.type_name(metadata.key()).into_owned(),
        };
        self.write_leaf(&text, value_format, length)
    }

    fn write_elements(
        &mut self,
        key: TypeKey,
        elements: Elements<'_>,
        depth: usize,
        here: Limits,
        children: Limits,
    ) -> fmt::Result {
        self.write_count(key, elements.len)?;
        let shown = here.length.unwrap_or(elements.len);

        self.writer.indent();
        let mut written = 0;
        for (index, element) in elements.iter.take(shown).enumerate() {
            self.writer.new_line()?;
            self.writer.write_label(&format!("[{}]", index))?;
            self.visit(element, None, depth + 1, children)?;
            written += 1;
        }
        self.write_remaining(elements.len.saturating_sub(written))?;
        self.writer.dedent();
        Ok(())
    }

    fn write_entries(
        &mut self,
        key: TypeKey,
        entries: Entries<'_>,
        depth: usize,
        here: Limits,
        children: Limits,
    ) -> fmt::Result {
        self.write_count(key, entries.len)?;
        let shown = here.length.unwrap_or(entries.len);

        self.writer.indent();
        let mut written = 0;
        for (entry_key, entry_value) in entries.iter.take(shown) {
            let label = format!("[{}]", self.key_text(entry_key));
            self.writer.new_line()?;
            self.writer.write_label(&label)?;
            self.visit(entry_value, None, depth + 1, children)?;
            written += 1;
        }
        self.write_remaining(entries.len.saturating_sub(written))?;
        self.writer.dedent();
        Ok(())
    }

    fn write_remaining(&mut self, remaining: usize) -> fmt::Result {
        if remaining == 0 {
            return Ok(());
        }
        self.writer.new_line()?;
        self.writer.write_value(&format!("... {} more", remaining))
    }

    /// Inline text of a map key
    fn key_text(&self, key: &dyn Dumpable) -> String {
        let shape = match shape_of(key) {
            Ok(shape) => shape,
            Err(message) => return format!("<error: {}>", message),
        };

        match shape {
            Shape::Leaf(text) => text.into_owned(),
            Shape::Null => NULL_MARKER.to_string(),
            Shape::Unavailable(reason) => format!("<{}>", reason),
            Shape::Transparent(inner) => self.key_text(inner),
            Shape::Owned(boxed) => self.key_text(&*boxed),
            Shape::Guarded(guard) => self.key_text(&**guard),
            Shape::Seq(_) | Shape::Map(_) | Shape::Object(_) => {
                self.type_name(key.type_key()).into_owned()
            }
        }
    }

    fn write_members(
        &mut self,
        owner: &dyn Dumpable,
        metadata: &TypeMetadata,
        depth: usize,
        children: Limits,
    ) -> fmt::Result {
        self.writer.write_value(&self.type_name(metadata.key()))?;

        self.writer.indent();
        for member in metadata.members() {
            if !member.annotation().include {
                continue;
            }
            self.write_member(owner, member, metadata.annotation(), depth, children)?;
        }
        self.writer.dedent();
        Ok(())
    }

    fn write_member(
        &mut self,
        owner: &dyn Dumpable,
        member: &MemberMetadata,
        container: &Annotation,
        depth: usize,
        children: Limits,
    ) -> fmt::Result {
        let annotation = member.annotation();

        match read_member(owner, member) {
            MemberValue::Borrowed(value) => {
                self.write_member_value(value, member, container, depth, children)
            }
            MemberValue::Owned(value) => {
                self.write_member_value(&*value, member, container, depth, children)
            }
            MemberValue::Failed(message) => {
                self.writer.new_line()?;
                self.writer.write_label(&self.label(member.name(), annotation, container))?;
                self.write_error(&message)
            }
        }
    }

    fn write_member_value(
        &mut self,
        value: &dyn Dumpable,
        member: &MemberMetadata,
        container: &Annotation,
        depth: usize,
        children: Limits,
    ) -> fmt::Result {
        let annotation = member.annotation();
        let include_nulls = annotation.include_nulls.or(container.include_nulls);
        if !include_nulls.is_dump() && resolves_to_null(value) {
            return Ok(());
        }

        self.writer.new_line()?;
        self.writer.write_label(&self.label(member.name(), annotation, container))?;
        self.visit(value, Some(annotation), depth + 1, children)
    }

    fn write_default_property(
        &mut self,
        owner: &dyn Dumpable,
        metadata: &TypeMetadata,
        name: &str,
        depth: usize,
        children: Limits,
    ) -> fmt::Result {
        let Some(member) = metadata.member(name) else {
            return self.write_error(&format!("unknown default property '{}'", name));
        };

        match read_member(owner, member) {
            MemberValue::Borrowed(value) => {
                self.visit(value, Some(member.annotation()), depth + 1, children)
            }
            MemberValue::Owned(value) => {
                self.visit(&*value, Some(member.annotation()), depth + 1, children)
            }
            MemberValue::Failed(message) => self.write_error(&message),
        }
    }

    /// Member name through the effective label template
    fn label<'n>(&self, name: &'n str, member: &Annotation, container: &Annotation) -> Cow<'n, str> {
        let Some(template) = member
            .label_format
            .as_deref()
            .or(container.label_format.as_deref())
        else {
            return Cow::Borrowed(name);
        };

        match format::apply(template, &[name]) {
            Ok(label) => Cow::Owned(label),
            Err(err) => {
                warn!(member = name, template, error = %err, "Label format failed");
                Cow::Borrowed(name)
            }
        }
    }
}

/// Read a member, turning getter panics into failures
fn read_member<'a>(owner: &'a dyn Dumpable, member: &MemberMetadata) -> MemberValue<'a> {
    let value = match isolate(|| member.read(owner)) {
        Ok(value) => value,
        Err(message) => MemberValue::Failed(format!("panic: {}", message)),
    };

    if let MemberValue::Failed(message) = &value {
        warn!(
            owner = owner.type_key().name(),
            member = member.name(),
            error = %message,
            "Member getter failed"
        );
    }
    value
}

/// Whether `value` is null once wrappers are peeled
///
/// A value whose shape panics is not null; `visit` renders the failure.
fn resolves_to_null(value: &dyn Dumpable) -> bool {
    let Ok(shape) = isolate(|| value.shape()) else {
        return false;
    };

    match shape {
        Shape::Null => true,
        Shape::Transparent(inner) => resolves_to_null(inner),
        Shape::Owned(boxed) => resolves_to_null(&*boxed),
        Shape::Guarded(guard) => resolves_to_null(&**guard),
        _ => false,
    }
}

/// Structural view of `value`, turning a panic into an error message
///
/// `Display` impls returning `fmt::Error` panic inside `to_string`, so leaf
/// shapes are user code too.
fn shape_of(value: &dyn Dumpable) -> Result<Shape<'_>, String> {
    isolate(|| value.shape()).map_err(|message| {
        warn!(target_type = value.type_key().name(), panic = %message, "Shape panicked");
        format!("panic: {}", message)
    })
}

/// First `limit` characters followed by the truncation suffix
fn truncate(text: &str, limit: Option<usize>) -> Cow<'_, str> {
    let Some(limit) = limit else {
        return Cow::Borrowed(text);
    };
    match text.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_SUFFIX)),
        None => Cow::Borrowed(text),
    }
}

/// Run user code, converting a panic into its message
fn isolate<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
