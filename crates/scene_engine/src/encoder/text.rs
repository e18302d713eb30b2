//! Human-readable text form
//!
//! Emits nested tagged elements for inspection and diffing:
//!
//! ```text
//! <Light id="sun">
//!   <lightType>1</lightType>
//!   <color>1 0.9 0.8</color>
//! </Light>
//! ```
//!
//! The text form is not meant to be read back.

use std::fmt::Display;
use std::io::Write;

use super::error::EncodeResult;

/// Indented element writer over any byte sink
pub struct TextWriter<'a> {
    out: &'a mut dyn Write,
    depth: usize,
    indent: usize,
}

impl<'a> TextWriter<'a> {
    /// Create a writer with the given indent width
    pub fn new(out: &'a mut dyn Write, indent: usize) -> Self {
        Self { out, depth: 0, indent }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn pad(&mut self) -> EncodeResult<()> {
        write!(self.out, "{:width$}", "", width = self.depth * self.indent)?;
        Ok(())
    }

    /// Open an element; the `id` attribute is printed only when non-empty
    pub fn element_start(&mut self, name: &str, id: &str) -> EncodeResult<()> {
        self.pad()?;
        if id.is_empty() {
            writeln!(self.out, "<{name}>")?;
        } else {
            writeln!(self.out, "<{name} id=\"{}\">", escape(id))?;
        }
        self.depth += 1;
        Ok(())
    }

    /// Close an element opened with [`element_start`](Self::element_start)
    pub fn element_end(&mut self, name: &str) -> EncodeResult<()> {
        self.depth = self.depth.saturating_sub(1);
        self.pad()?;
        writeln!(self.out, "</{name}>")?;
        Ok(())
    }

    /// Write a single-value field
    pub fn write_field(&mut self, name: &str, value: impl Display) -> EncodeResult<()> {
        self.pad()?;
        let value = escape(&value.to_string());
        writeln!(self.out, "<{name}>{value}</{name}>")?;
        Ok(())
    }

    /// Write a space-separated float field
    pub fn write_floats(&mut self, name: &str, values: &[f32]) -> EncodeResult<()> {
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        self.write_field(name, joined)
    }

    /// Write a reference to another object as `#id`
    pub fn write_xref_field(&mut self, name: &str, id: &str) -> EncodeResult<()> {
        self.write_field(name, format_args!("#{id}"))
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
