//! Contract Test: Custom Formatters and Failures
//!
//! Constraints verified:
//! - Formatter precedence: member, then registry, then type
//! - A failing or panicking formatter renders an inline error
//! - A failing or panicking getter renders an inline error and the dump
//!   continues with the next member
//! - A value whose own rendering fails or panics renders an inline error
//! - Value and label templates apply to rendered text
//!
//! If this test fails, one bad value can abort a whole diagnostic dump.

mod common;

use std::collections::BTreeMap;
use std::fmt;

use common::*;
use vardump_core::{
    Annotation, Describe, DumpFn, Dumpable, Shape, TypeDescriptor, dumpable_display,
    dumpable_object,
};

fn invoice() -> Invoice {
    Invoice {
        total: Money { cents: 1999 },
        tax: Money { cents: 160 },
    }
}

#[test]
fn registry_formatter_replaces_default_rendering() {
    let dumper = dumper();
    dumper.register_formatter::<Money>(dollars());

    assert_eq!(dumper.dump(&invoice()), "Invoice\n  total: $19.99\n  tax: 160c");
    assert_eq!(dumper.registry().formatter_count(), 1);
}

#[test]
fn without_formatter_objects_expand() {
    let dumper = dumper();

    assert_eq!(
        dumper.dump(&invoice()),
        "Invoice\n  total: Money\n    cents: 1999\n  tax: 160c"
    );
}

#[test]
fn type_formatter_has_lowest_precedence() {
    let dumper = dumper();
    dumper.register_shadow_descriptor::<Money, Money>(TypeDescriptor::new().annotate(
        Annotation::new().dump_with(DumpFn::new(|m: &Money| Ok(format!("{} cents", m.cents)))),
    ));
    assert_eq!(
        dumper.dump(&invoice()),
        "Invoice\n  total: 1999 cents\n  tax: 160c"
    );

    dumper.register_formatter::<Money>(dollars());
    assert_eq!(dumper.dump(&invoice()), "Invoice\n  total: $19.99\n  tax: 160c");
}

#[test]
fn formatter_for_another_type_is_ignored() {
    let dumper = dumper();
    dumper.register_shadow_descriptor::<Money, Money>(TypeDescriptor::new().annotate(
        Annotation::new().dump_with(DumpFn::new(|s: &String| Ok(s.to_uppercase()))),
    ));

    assert_eq!(dumper.dump(&Money { cents: 5 }), "Money\n  cents: 5");
}

#[test]
fn failing_formatter_renders_inline_error() {
    let dumper = dumper();
    dumper.register_formatter::<Money>(DumpFn::new(|_: &Money| {
        Err(anyhow::anyhow!("rate unavailable"))
    }));

    assert_eq!(dumper.dump(&Money { cents: 1 }), "<error: rate unavailable>");
}

#[test]
fn panicking_formatter_renders_inline_error() {
    let dumper = dumper();
    dumper.register_formatter::<Money>(DumpFn::new(|_: &Money| -> anyhow::Result<String> {
        panic!("formatter bug")
    }));

    assert_eq!(
        dumper.dump(&invoice()),
        "Invoice\n  total: <error: panic: formatter bug>\n  tax: 160c"
    );
}

#[test]
fn failing_getters_do_not_stop_the_dump() {
    let dumper = dumper();

    assert_eq!(
        dumper.dump(&Flaky { ok: 1 }),
        "Flaky\n  ok: 1\n  broken: <error: sensor offline>\n  exploding: <error: panic: kaboom>\n  doubled: 2"
    );
}

struct Reading {
    ratio: f64,
    unit: String,
}

impl Describe for Reading {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .annotate(Annotation::new().label_format("<{0}>"))
            .field_with(
                "ratio",
                Annotation::new().value_format("{0,6}|"),
                |r: &Reading| &r.ratio,
            )
            .field_with(
                "unit",
                Annotation::new().value_format("{1}").label_format("{0,-5}"),
                |r: &Reading| &r.unit,
            )
    }
}

dumpable_object!(Reading);

#[test]
fn value_and_label_templates() {
    let dumper = dumper();
    let reading = Reading {
        ratio: 0.5,
        unit: "kPa".to_string(),
    };

    let output = dumper.dump(&reading);
    assert!(output.starts_with("Reading\n  <ratio>:    0.5|\n"));
    assert!(output.contains("unit : <error: Format error:"));
}

#[test]
fn formatter_output_is_truncated_like_text() {
    let dumper = dumper();
    dumper.register_formatter::<Money>(DumpFn::new(|m: &Money| {
        Ok(format!("{} cents and counting", m.cents))
    }));
    dumper.register_shadow_descriptor::<Money, Money>(
        TypeDescriptor::new().annotate(Annotation::new().max_length(4)),
    );

    assert_eq!(dumper.dump(&Money { cents: 12345 }), "1234...");
}

/// `Display` that always fails
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Fragile;

impl fmt::Display for Fragile {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

dumpable_display!(Fragile);

/// `Dumpable` whose shape panics
struct Brittle;

impl Dumpable for Brittle {
    fn shape(&self) -> Shape<'_> {
        panic!("shape exploded")
    }
}

struct Holder {
    ok: u8,
    fragile: Fragile,
    brittle: Brittle,
}

impl Describe for Holder {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("ok", |h: &Holder| &h.ok)
            .field("fragile", |h: &Holder| &h.fragile)
            .field("brittle", |h: &Holder| &h.brittle)
            .computed("after", |h: &Holder| Ok(h.ok + 1))
    }
}

dumpable_object!(Holder);

#[test]
fn failing_value_rendering_does_not_stop_the_dump() {
    let dumper = dumper();
    let holder = Holder {
        ok: 1,
        fragile: Fragile,
        brittle: Brittle,
    };

    let output = dumper.dump(&holder);
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Holder");
    assert_eq!(lines[1], "  ok: 1");
    assert!(lines[2].starts_with("  fragile: <error: panic: "));
    assert_eq!(lines[3], "  brittle: <error: panic: shape exploded>");
    assert_eq!(lines[4], "  after: 2");
}

#[test]
fn panicking_root_and_map_keys_render_inline() {
    let dumper = dumper();
    assert_eq!(dumper.dump(&Brittle), "<error: panic: shape exploded>");

    let mut map = BTreeMap::new();
    map.insert(Fragile, 7);
    let output = dumper.dump(&map);
    assert!(output.starts_with("BTreeMap<Fragile, i32> (count: 1)\n  [<error: panic: "));
    assert!(output.ends_with("]: 7"));
}

#[test]
fn skipped_nulls_tolerate_panicking_shapes() {
    let dumper = dumper();
    dumper.register_shadow_descriptor::<Holder, Holder>(
        TypeDescriptor::new().annotate(Annotation::new().include_nulls(vardump_core::Tristate::Skip)),
    );
    let holder = Holder {
        ok: 1,
        fragile: Fragile,
        brittle: Brittle,
    };

    assert!(dumper.dump(&holder).contains("  brittle: <error: panic: shape exploded>"));
}
