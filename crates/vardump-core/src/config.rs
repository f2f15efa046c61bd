//! Configuration types for the dumper
//!
//! [`DumpOptions`] supplies the initial limits and layout for every dump
//! performed by an [`ObjectDumper`](crate::ObjectDumper). Annotations on
//! types and members refine these defaults during traversal.

use serde::{Deserialize, Serialize};

use crate::annotation::{DEFAULT_MASK, Limit};

/// Largest accepted indent width
const MAX_INDENT_WIDTH: usize = 16;

/// Options applied to a whole dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpOptions {
    /// Deepest structural level that is expanded; the root is level 0
    #[serde(default = "default_max_depth")]
    pub max_depth: Limit,

    /// Character limit for leaves and element limit for collections
    #[serde(default = "default_max_length")]
    pub max_length: Limit,

    /// Spaces per nesting level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// How type names are rendered in headers and summaries
    #[serde(default)]
    pub type_names: TypeNameStyle,

    /// Placeholder for masked values without their own mask value
    #[serde(default = "default_mask_value")]
    pub mask_value: String,
}

impl DumpOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_length: default_max_length(),
            indent_width: default_indent_width(),
            type_names: TypeNameStyle::default(),
            mask_value: default_mask_value(),
        }
    }

    /// Parse options from JSON and validate them
    ///
    /// Missing fields take their defaults; limits use `-1` for unlimited.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vardump_core::{DumpOptions, Limit};
    ///
    /// let options = DumpOptions::from_json_str(r#"{ "max_depth": -1 }"#).unwrap();
    /// assert_eq!(options.max_depth, Limit::Unlimited);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let options: DumpOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.indent_width == 0 || self.indent_width > MAX_INDENT_WIDTH {
            return Err(crate::Error::config(format!(
                "indent_width must be between 1 and {}, got {}",
                MAX_INDENT_WIDTH, self.indent_width
            )));
        }

        if self.mask_value.is_empty() {
            return Err(crate::Error::config("mask_value cannot be empty"));
        }

        if self.mask_value.contains('\n') {
            return Err(crate::Error::config("mask_value cannot span lines"));
        }

        Ok(())
    }

    /// Set the depth limit
    pub fn with_max_depth(mut self, max_depth: Limit) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the length limit
    pub fn with_max_length(mut self, max_length: Limit) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the indent width
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    /// Set the type name style
    pub fn with_type_names(mut self, type_names: TypeNameStyle) -> Self {
        self.type_names = type_names;
        self
    }

    /// Set the default mask placeholder
    pub fn with_mask_value(mut self, mask_value: impl Into<String>) -> Self {
        self.mask_value = mask_value.into();
        self
    }
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Type name rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeNameStyle {
    /// Module paths stripped (`Vec<String>`)
    #[default]
    Short,
    /// Fully qualified (`alloc::vec::Vec<alloc::string::String>`)
    Full,
}

fn default_max_depth() -> Limit {
    Limit::At(5)
}

fn default_max_length() -> Limit {
    Limit::Unlimited
}

fn default_indent_width() -> usize {
    2
}

fn default_mask_value() -> String {
    DEFAULT_MASK.to_string()
}
