//! Indented markup output.

use cal_shared::{CURRENT_FILE_VERSION, ResourceFormat};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::syntax;
use crate::error::CodecResult;

/// Shortest text that parses back to the same `f32`.
///
/// Very small and very large magnitudes use exponent notation so that values
/// such as `1.31134e-6` stay compact.
pub fn format_float(v: f32) -> String {
    let magnitude = v.abs();
    if v != 0.0 && v.is_finite() && !(1e-4..1e7).contains(&magnitude) {
        format!("{v:e}")
    } else {
        format!("{v}")
    }
}

/// Space-separated floats.
pub fn format_floats(values: &[f32]) -> String {
    values
        .iter()
        .map(|&v| format_float(v))
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct MarkupWriter {
    inner: Writer<Vec<u8>>,
}

impl MarkupWriter {
    /// Start a document with the `HEADER` element for `format`.
    pub fn new(format: &ResourceFormat) -> CodecResult<Self> {
        let mut writer = Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 4),
        };
        let version = CURRENT_FILE_VERSION.to_string();
        writer.empty(
            "HEADER",
            &[("MAGIC", format.markup_magic), ("VERSION", version.as_str())],
        )?;
        Ok(writer)
    }

    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> CodecResult<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.inner.write_event(Event::Start(start)).map_err(syntax)
    }

    pub fn end(&mut self, name: &str) -> CodecResult<()> {
        self.inner
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(syntax)
    }

    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> CodecResult<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.inner.write_event(Event::Empty(start)).map_err(syntax)
    }

    /// `<name attrs>text</name>` on one line.
    pub fn text(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> CodecResult<()> {
        self.start(name, attributes)?;
        self.inner
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(syntax)?;
        self.end(name)
    }

    pub fn floats(&mut self, name: &str, values: &[f32]) -> CodecResult<()> {
        self.text(name, &[], &format_floats(values))
    }

    pub fn finish(self) -> Vec<u8> {
        let mut bytes = self.inner.into_inner();
        bytes.push(b'\n');
        bytes
    }
}
