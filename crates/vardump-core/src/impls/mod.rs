// # Built-in Dumpable Implementations
//
// This module provides implementations of the Dumpable trait for the
// standard library and for the third-party types the crate depends on.

pub mod external;
pub mod stdlib;
