// # Third-Party Implementations
//
// Leaves for chrono date/time types, uuid and url; structural views of
// `serde_json::Value`; and `anyhow::Error` rendered with its context chain.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::traits::{Dumpable, Shape};

impl<Tz> Dumpable for DateTime<Tz>
where
    Tz: TimeZone + 'static,
    Tz::Offset: fmt::Display,
{
    fn shape(&self) -> Shape<'_> {
        Shape::leaf(self.to_rfc3339())
    }
}

impl Dumpable for NaiveDate {
    fn shape(&self) -> Shape<'_> {
        Shape::display(self)
    }
}

impl Dumpable for NaiveDateTime {
    fn shape(&self) -> Shape<'_> {
        Shape::display(self)
    }
}

impl Dumpable for NaiveTime {
    fn shape(&self) -> Shape<'_> {
        Shape::display(self)
    }
}

impl Dumpable for TimeDelta {
    fn shape(&self) -> Shape<'_> {
        Shape::display(self)
    }
}

impl Dumpable for serde_json::Value {
    fn shape(&self) -> Shape<'_> {
        use serde_json::Value;

        match self {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::display(b),
            Value::Number(n) => Shape::display(n),
            Value::String(s) => Shape::Leaf(Cow::Borrowed(s.as_str())),
            Value::Array(items) => Shape::seq(items.len(), items.iter()),
            Value::Object(map) => Shape::map(map.len(), map.iter()),
        }
    }
}

impl Dumpable for serde_json::Map<String, serde_json::Value> {
    fn shape(&self) -> Shape<'_> {
        Shape::map(self.len(), self.iter())
    }
}

impl Dumpable for anyhow::Error {
    fn shape(&self) -> Shape<'_> {
        Shape::leaf(format!("{:#}", self))
    }
}

#[cfg(feature = "uuid")]
impl Dumpable for uuid::Uuid {
    fn shape(&self) -> Shape<'_> {
        Shape::display(self)
    }
}

#[cfg(feature = "url")]
impl Dumpable for url::Url {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self.as_str()))
    }
}
