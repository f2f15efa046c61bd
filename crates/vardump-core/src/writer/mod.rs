// # Dump Writer
//
// Appends labels, values and indentation to an output sink. The writer
// knows nothing about types; the traversal engine decides what to write and
// the writer keeps multi-line values aligned with the current nesting level.
//
// ## Layout
//
// ```text
// Person
//   name: Alice
//   address: Address
//     city: Paris
// ```
//
// Every line after the first starts with `level * indent_width` spaces.
// No trailing newline is written.

use std::fmt;
use std::io;

/// Indentation-aware writer over any `fmt::Write` sink
pub struct DumpWriter<'w> {
    sink: &'w mut dyn fmt::Write,
    indent_unit: String,
    level: usize,
}

impl<'w> DumpWriter<'w> {
    /// Create a writer at level 0
    ///
    /// # Parameters
    ///
    /// - `sink`: Destination of the rendered text
    /// - `indent_width`: Spaces per nesting level
    pub fn new(sink: &'w mut dyn fmt::Write, indent_width: usize) -> Self {
        Self {
            sink,
            indent_unit: " ".repeat(indent_width),
            level: 0,
        }
    }

    /// Current nesting level
    pub fn level(&self) -> usize {
        self.level
    }

    /// Increase the nesting level for subsequent lines
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decrease the nesting level for subsequent lines
    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Start a new line at the current nesting level
    pub fn new_line(&mut self) -> fmt::Result {
        self.sink.write_char('\n')?;
        for _ in 0..self.level {
            self.sink.write_str(&self.indent_unit)?;
        }
        Ok(())
    }

    /// Write `label: `
    pub fn write_label(&mut self, label: &str) -> fmt::Result {
        self.write_value(label)?;
        self.sink.write_str(": ")
    }

    /// Write a value, indenting each embedded line break to the current level
    pub fn write_value(&mut self, value: &str) -> fmt::Result {
        let mut lines = value.split('\n');
        if let Some(first) = lines.next() {
            self.sink.write_str(first.strip_suffix('\r').unwrap_or(first))?;
        }
        for line in lines {
            self.new_line()?;
            self.sink.write_str(line.strip_suffix('\r').unwrap_or(line))?;
        }
        Ok(())
    }
}

/// Adapts an `io::Write` byte sink to `fmt::Write`
///
/// `fmt::Error` carries no detail, so the first `io::Error` is kept and
/// further writes are refused.
pub struct IoSink<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> IoSink<W> {
    /// Wrap a byte sink
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Take the stored I/O error, if a write failed
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Flush and return the inner sink, or the first I/O error
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: io::Write> fmt::Write for IoSink<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.error.is_some() {
            return Err(fmt::Error);
        }
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}
