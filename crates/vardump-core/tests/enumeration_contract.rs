//! Contract Test: Collection Enumeration
//!
//! Constraints verified:
//! - A sequence or map with enumeration skipped renders only its count header
//! - A collection with recursion skipped renders only its count header
//! - Type-level enumeration settings come from shadows on the collection type
//! - A member setting overrides the collection type's setting
//!
//! If this test fails, large collections flood dumps meant to summarize them.

mod common;

use std::collections::BTreeMap;

use common::*;
use vardump_core::{Annotation, Describe, Tristate, TypeDescriptor, dumpable_object};

struct Shelf {
    labels: Vec<i32>,
    stock: BTreeMap<String, i32>,
    bins: Vec<i32>,
}

impl Describe for Shelf {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field_with(
                "labels",
                Annotation::new().enumerate(Tristate::Skip),
                |s: &Shelf| &s.labels,
            )
            .field_with(
                "stock",
                Annotation::new().enumerate(Tristate::Skip),
                |s: &Shelf| &s.stock,
            )
            .field_with(
                "bins",
                Annotation::new().recurse(Tristate::Skip),
                |s: &Shelf| &s.bins,
            )
    }
}

dumpable_object!(Shelf);

fn shelf() -> Shelf {
    let mut stock = BTreeMap::new();
    stock.insert("apples".to_string(), 3);
    stock.insert("pears".to_string(), 5);

    Shelf {
        labels: vec![1, 2, 3],
        stock,
        bins: vec![10, 20],
    }
}

/// Same vectors, with per-member enumeration forced on
struct Crate {
    forced: Vec<i32>,
    inherited: Vec<i32>,
}

impl Describe for Crate {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field_with(
                "forced",
                Annotation::new().enumerate(Tristate::Dump),
                |c: &Crate| &c.forced,
            )
            .field("inherited", |c: &Crate| &c.inherited)
    }
}

dumpable_object!(Crate);

#[test]
fn skipped_members_render_count_headers() {
    let dumper = dumper();

    assert_eq!(
        dumper.dump(&shelf()),
        "Shelf\n  labels: Vec<i32> (count: 3)\n  stock: BTreeMap<String, i32> (count: 2)\n  bins: Vec<i32> (count: 2)"
    );
}

#[test]
fn unannotated_collections_enumerate() {
    let dumper = dumper();
    let shelf = shelf();

    assert_eq!(
        dumper.dump(&shelf.stock),
        "BTreeMap<String, i32> (count: 2)\n  [apples]: 3\n  [pears]: 5"
    );
    assert_eq!(
        dumper.dump(&shelf.labels),
        "Vec<i32> (count: 3)\n  [0]: 1\n  [1]: 2\n  [2]: 3"
    );
}

#[test]
fn shadow_skips_enumeration_for_collection_type() {
    let dumper = dumper();
    dumper.register_shadow_descriptor::<Vec<i32>, Vec<i32>>(
        TypeDescriptor::new().annotate(Annotation::new().enumerate(Tristate::Skip)),
    );

    assert_eq!(dumper.dump(&vec![1, 2, 3]), "Vec<i32> (count: 3)");
    assert_eq!(
        dumper.dump(&vec!["x".to_string()]),
        "Vec<String> (count: 1)\n  [0]: x"
    );
}

#[test]
fn member_setting_overrides_collection_type() {
    let dumper = dumper();
    dumper.register_shadow_descriptor::<Vec<i32>, Vec<i32>>(
        TypeDescriptor::new().annotate(Annotation::new().enumerate(Tristate::Skip)),
    );
    let boxed = Crate {
        forced: vec![4, 5],
        inherited: vec![6, 7, 8],
    };

    assert_eq!(
        dumper.dump(&boxed),
        "Crate\n  forced: Vec<i32> (count: 2)\n    [0]: 4\n    [1]: 5\n  inherited: Vec<i32> (count: 3)"
    );
}

#[test]
fn shadow_skips_recursion_for_map_type() {
    let dumper = dumper();
    dumper.register_shadow_descriptor::<BTreeMap<String, i32>, BTreeMap<String, i32>>(
        TypeDescriptor::new().annotate(Annotation::new().recurse(Tristate::Skip)),
    );

    assert_eq!(dumper.dump(&shelf().stock), "BTreeMap<String, i32> (count: 2)");
}
