//! Fixtures and common utilities for dumper contract tests
//!
//! Each fixture exercises one annotation or traversal rule. Not every test
//! file uses every fixture.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vardump_core::{
    Annotation, Describe, DumpFn, ObjectDumper, Tristate, TypeDescriptor, dumpable_object,
};

/// Install a fmt subscriber writing through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A dumper isolated from every other test
pub fn dumper() -> ObjectDumper {
    init_tracing();
    ObjectDumper::new()
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

pub struct Address {
    pub street: String,
    pub city: String,
}

impl Describe for Address {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("street", |a: &Address| &a.street)
            .field("city", |a: &Address| &a.city)
            .summary(|a: &Address| format!("{}, {}", a.street, a.city))
    }
}

pub struct Person {
    pub name: String,
    pub age: u32,
    pub address: Option<Address>,
}

impl Describe for Person {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("name", |p: &Person| &p.name)
            .field("age", |p: &Person| &p.age)
            .field("address", |p: &Person| &p.address)
    }
}

dumpable_object!(Address, Person);

pub fn alice() -> Person {
    Person {
        name: "Alice".to_string(),
        age: 30,
        address: Some(Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Graphs
// ---------------------------------------------------------------------------

/// Linked node whose successor can be rewired after construction
pub struct Node {
    pub name: String,
    pub next: RefCell<Option<Rc<Node>>>,
}

impl Node {
    pub fn new(name: &str) -> Rc<Node> {
        Rc::new(Node {
            name: name.to_string(),
            next: RefCell::new(None),
        })
    }

    pub fn link(&self, next: &Rc<Node>) {
        *self.next.borrow_mut() = Some(Rc::clone(next));
    }

    pub fn unlink(&self) {
        self.next.borrow_mut().take();
    }
}

impl Describe for Node {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("name", |n: &Node| &n.name)
            .field("next", |n: &Node| &n.next)
    }
}

/// Singly linked chain for depth tests
pub struct Chain {
    pub level: u32,
    pub next: Option<Box<Chain>>,
}

impl Chain {
    /// Chain of `len` links numbered from 0
    pub fn of(len: u32) -> Chain {
        (0..len)
            .rev()
            .fold(None, |next, level| Some(Box::new(Chain { level, next })))
            .map(|head| *head)
            .unwrap_or(Chain {
                level: 0,
                next: None,
            })
    }
}

impl Describe for Chain {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("level", |c: &Chain| &c.level)
            .field("next", |c: &Chain| &c.next)
    }
}

dumpable_object!(Node, Chain);

// ---------------------------------------------------------------------------
// Annotated fixtures
// ---------------------------------------------------------------------------

/// Declared out of order; rendered as minus, zero, plus, then unordered
pub struct Ordered {
    pub zero: i32,
    pub unordered: i32,
    pub plus: i32,
    pub minus: i32,
}

impl Describe for Ordered {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field_with("zero", Annotation::new().order(0), |o: &Ordered| &o.zero)
            .field("unordered", |o: &Ordered| &o.unordered)
            .field_with("plus", Annotation::new().order(1), |o: &Ordered| &o.plus)
            .field_with("minus", Annotation::new().order(-1), |o: &Ordered| &o.minus)
    }
}

pub struct Contact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Describe for Contact {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("name", |c: &Contact| &c.name)
            .field_with(
                "phone",
                Annotation::new().include_nulls(Tristate::Skip),
                |c: &Contact| &c.phone,
            )
            .field("email", |c: &Contact| &c.email)
    }
}

/// Skips nulls at type level, except for `reason`
pub struct Sparse {
    pub id: u32,
    pub parent: Option<u32>,
    pub reason: Option<String>,
}

impl Describe for Sparse {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .annotate(Annotation::new().include_nulls(Tristate::Skip))
            .field("id", |s: &Sparse| &s.id)
            .field("parent", |s: &Sparse| &s.parent)
            .field_with(
                "reason",
                Annotation::new().include_nulls(Tristate::Dump),
                |s: &Sparse| &s.reason,
            )
    }
}

pub struct Note {
    pub title: String,
    pub text: String,
}

impl Describe for Note {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("title", |n: &Note| &n.title)
            .field_with("text", Annotation::new().max_length(10), |n: &Note| &n.text)
    }
}

pub struct Bag {
    pub items: Vec<i32>,
    pub all: Vec<i32>,
}

impl Describe for Bag {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field_with("items", Annotation::new().max_length(2), |b: &Bag| &b.items)
            .field_with("all", Annotation::new().unlimited_length(), |b: &Bag| &b.all)
    }
}

pub struct Credentials {
    pub user: String,
    pub password: String,
    pub pin: u32,
}

impl Describe for Credentials {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("user", |c: &Credentials| &c.user)
            .field_with("password", Annotation::new().masked(), |c: &Credentials| {
                &c.password
            })
            .field_with("pin", Annotation::new().mask_with("####"), |c: &Credentials| {
                &c.pin
            })
    }
}

/// Renders as just its name
pub struct Tag {
    pub name: String,
    pub color: String,
}

impl Describe for Tag {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .annotate(Annotation::new().default_property("name"))
            .field("name", |t: &Tag| &t.name)
            .field("color", |t: &Tag| &t.color)
    }
}

pub struct Ticket {
    pub id: u32,
    pub tag: Tag,
}

impl Describe for Ticket {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("id", |t: &Ticket| &t.id)
            .field("tag", |t: &Ticket| &t.tag)
    }
}

pub struct Flaky {
    pub ok: u8,
}

impl Describe for Flaky {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("ok", |f: &Flaky| &f.ok)
            .computed("broken", |_: &Flaky| -> anyhow::Result<u8> {
                Err(anyhow::anyhow!("sensor offline"))
            })
            .computed("exploding", |_: &Flaky| -> anyhow::Result<u8> {
                panic!("kaboom")
            })
            .computed("doubled", |f: &Flaky| Ok(u32::from(f.ok) * 2))
    }
}

pub struct Money {
    pub cents: i64,
}

impl Describe for Money {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new().field("cents", |m: &Money| &m.cents)
    }
}

pub fn dollars() -> DumpFn {
    DumpFn::new(|m: &Money| Ok(format!("${}.{:02}", m.cents / 100, m.cents % 100)))
}

pub struct Invoice {
    pub total: Money,
    pub tax: Money,
}

impl Describe for Invoice {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("total", |i: &Invoice| &i.total)
            .field_with(
                "tax",
                Annotation::new().dump_with(DumpFn::new(|m: &Money| Ok(format!("{}c", m.cents)))),
                |i: &Invoice| &i.tax,
            )
    }
}

dumpable_object!(
    Ordered,
    Contact,
    Sparse,
    Note,
    Bag,
    Credentials,
    Tag,
    Ticket,
    Flaky,
    Money,
    Invoice
);

// ---------------------------------------------------------------------------
// Foreign type with shadow metadata
// ---------------------------------------------------------------------------

/// Stands in for a type owned by another crate: members, no annotations
pub struct VendorRecord {
    pub id: u32,
    pub api_key: String,
    pub notes: Option<String>,
}

impl Describe for VendorRecord {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .field("id", |v: &VendorRecord| &v.id)
            .field("api_key", |v: &VendorRecord| &v.api_key)
            .field("notes", |v: &VendorRecord| &v.notes)
    }
}

dumpable_object!(VendorRecord);

pub struct VendorRecordShadow;

impl Describe for VendorRecordShadow {
    fn describe() -> TypeDescriptor<Self> {
        TypeDescriptor::new()
            .annotate(Annotation::new().include_nulls(Tristate::Skip))
            .annotate_member("api_key", Annotation::new().masked().order(0))
            .annotate_member("id", Annotation::new().order(1))
    }
}

pub fn vendor_record() -> VendorRecord {
    VendorRecord {
        id: 7,
        api_key: "sk-live-123".to_string(),
        notes: None,
    }
}
