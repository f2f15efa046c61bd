// # Standard Library Implementations
//
// - Scalars and strings are leaves
// - `Option`, `Box`, `Rc`, `Arc` and `&'static T` are transparent
// - `RefCell`, `Mutex`, `RwLock` are inspected without blocking
// - Collections are sequences or maps

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::rc::{self, Rc};
use std::sync::{self, Arc, Mutex, RwLock, TryLockError};
use std::time::Duration;

use crate::traits::{Dumpable, Shape};

macro_rules! display_leaf {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Dumpable for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::display(self)
                }
            }
        )+
    };
}

display_leaf!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl Dumpable for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self.as_str()))
    }
}

impl Dumpable for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self))
    }
}

impl Dumpable for &'static str {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self))
    }
}

impl Dumpable for Cow<'static, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self.as_ref()))
    }
}

impl Dumpable for Box<str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self))
    }
}

impl Dumpable for Arc<str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self))
    }
}

impl Dumpable for Rc<str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self))
    }
}

impl Dumpable for () {
    fn shape(&self) -> Shape<'_> {
        Shape::leaf("()")
    }
}

impl Dumpable for Duration {
    fn shape(&self) -> Shape<'_> {
        Shape::debug(self)
    }
}

impl Dumpable for Path {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(self.to_string_lossy())
    }
}

impl Dumpable for PathBuf {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(self.to_string_lossy())
    }
}

impl<T: Dumpable> Dumpable for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => Shape::Transparent(value),
            None => Shape::Null,
        }
    }
}

impl<T: Dumpable> Dumpable for Box<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Transparent(&**self)
    }
}

impl Dumpable for Box<dyn Dumpable> {
    fn shape(&self) -> Shape<'_> {
        Shape::Transparent(&**self)
    }
}

impl<T: Dumpable> Dumpable for &'static T {
    fn shape(&self) -> Shape<'_> {
        Shape::Transparent(*self)
    }
}

impl<T: Dumpable> Dumpable for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Transparent(&**self)
    }
}

impl Dumpable for Rc<dyn Dumpable> {
    fn shape(&self) -> Shape<'_> {
        Shape::Transparent(&**self)
    }
}

impl<T: Dumpable> Dumpable for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Transparent(&**self)
    }
}

impl Dumpable for Arc<dyn Dumpable> {
    fn shape(&self) -> Shape<'_> {
        Shape::Transparent(&**self)
    }
}

impl<T: Dumpable> Dumpable for rc::Weak<T> {
    fn shape(&self) -> Shape<'_> {
        match self.upgrade() {
            Some(strong) => Shape::Owned(Box::new(strong)),
            None => Shape::Null,
        }
    }
}

impl<T: Dumpable> Dumpable for sync::Weak<T> {
    fn shape(&self) -> Shape<'_> {
        match self.upgrade() {
            Some(strong) => Shape::Owned(Box::new(strong)),
            None => Shape::Null,
        }
    }
}

impl<T: Dumpable + Copy> Dumpable for Cell<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Owned(Box::new(self.get()))
    }
}

impl<T: Dumpable> Dumpable for RefCell<T> {
    fn shape(&self) -> Shape<'_> {
        match self.try_borrow() {
            Ok(guard) => Shape::Guarded(Box::new(std::cell::Ref::map(guard, |value| {
                value as &dyn Dumpable
            }))),
            Err(_) => Shape::Unavailable("mutably borrowed"),
        }
    }
}

/// Presents a lock guard as `dyn Dumpable`
struct GuardView<G>(G);

impl<G> Deref for GuardView<G>
where
    G: Deref,
    G::Target: Dumpable + Sized,
{
    type Target = dyn Dumpable;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl<T: Dumpable> Dumpable for Mutex<T> {
    fn shape(&self) -> Shape<'_> {
        match self.try_lock() {
            Ok(guard) => Shape::Guarded(Box::new(GuardView(guard))),
            Err(TryLockError::Poisoned(poisoned)) => {
                Shape::Guarded(Box::new(GuardView(poisoned.into_inner())))
            }
            Err(TryLockError::WouldBlock) => Shape::Unavailable("locked"),
        }
    }
}

impl<T: Dumpable> Dumpable for RwLock<T> {
    fn shape(&self) -> Shape<'_> {
        match self.try_read() {
            Ok(guard) => Shape::Guarded(Box::new(GuardView(guard))),
            Err(TryLockError::Poisoned(poisoned)) => {
                Shape::Guarded(Box::new(GuardView(poisoned.into_inner())))
            }
            Err(TryLockError::WouldBlock) => Shape::Unavailable("locked"),
        }
    }
}

impl<T: Dumpable> Dumpable for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::seq(self.len(), self.iter())
    }
}

impl<T: Dumpable, const N: usize> Dumpable for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::seq(N, self.iter())
    }
}

impl<T: Dumpable> Dumpable for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::seq(self.len(), self.iter())
    }
}

impl<T: Dumpable> Dumpable for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::seq(self.len(), self.iter())
    }
}

impl<T: Dumpable, S: 'static> Dumpable for HashSet<T, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::seq(self.len(), self.iter())
    }
}

impl<T: Dumpable> Dumpable for BTreeSet<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::seq(self.len(), self.iter())
    }
}

impl<K: Dumpable, V: Dumpable, S: 'static> Dumpable for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::map(self.len(), self.iter())
    }
}

impl<K: Dumpable, V: Dumpable> Dumpable for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::map(self.len(), self.iter())
    }
}
