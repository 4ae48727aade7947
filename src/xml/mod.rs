//! XML emission built on the quick-xml event writer.
//!
//! Small tag helpers keep the schema code linear; every numeric field goes
//! through [`num`] so the document can never contain nan/inf/empty text.

pub mod fdm_config;

pub use fdm_config::{write_fdm_config, AeroCoefficients, AERO_DEFAULTS};

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::utils::{FdmError, Result};

pub(crate) type XmlWriter = Writer<Cursor<Vec<u8>>>;

pub(crate) trait ToXml {
    fn write_xml(&self, writer: &mut XmlWriter) -> Result<()>;
}

fn xml_error<E: std::fmt::Display>(e: E) -> FdmError {
    FdmError::Xml(e.to_string())
}

pub(crate) fn write_decl(writer: &mut XmlWriter) -> Result<()> {
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)
}

pub(crate) fn write_tag_start(writer: &mut XmlWriter, tag_name: &str) -> Result<()> {
    write_tag_start_with_attrs(writer, tag_name, &[])
}

pub(crate) fn write_tag_start_with_attrs(
    writer: &mut XmlWriter,
    tag_name: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut elem = BytesStart::new(tag_name);
    for attr in attrs.iter() {
        elem.push_attribute(*attr);
    }
    writer.write_event(Event::Start(elem)).map_err(xml_error)
}

pub(crate) fn write_tag_end(writer: &mut XmlWriter, tag_name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag_name)))
        .map_err(xml_error)
}

pub(crate) fn write_tag_text(writer: &mut XmlWriter, content: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(xml_error)
}

pub(crate) fn write_tag(writer: &mut XmlWriter, tag_name: &str, content: &str) -> Result<()> {
    write_tag_with_attrs(writer, tag_name, content, &[])
}

pub(crate) fn write_tag_with_attrs(
    writer: &mut XmlWriter,
    tag_name: &str,
    content: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    write_tag_start_with_attrs(writer, tag_name, attrs)?;
    write_tag_text(writer, content)?;
    write_tag_end(writer, tag_name)
}

pub(crate) fn write_empty_tag(writer: &mut XmlWriter, tag_name: &str) -> Result<()> {
    writer
        .write_event(Event::Empty(BytesStart::new(tag_name)))
        .map_err(xml_error)
}

/// Numeric text with a fixed precision. Non-finite input becomes zero so the
/// document stays loadable.
pub(crate) fn num(value: f64, precision: usize) -> String {
    let v = if value.is_finite() { value } else { 0.0 };
    format!("{v:.precision$}")
}

pub(crate) fn finish(writer: XmlWriter) -> Result<String> {
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| FdmError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_sanitizes_non_finite() {
        assert_eq!(num(1.23456, 4), "1.2346");
        assert_eq!(num(f64::NAN, 4), "0.0000");
        assert_eq!(num(f64::INFINITY, 2), "0.00");
        assert_eq!(num(f64::NEG_INFINITY, 4), "0.0000");
    }

    #[test]
    fn tag_helpers_nest() {
        let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        write_tag_start(&mut w, "outer").unwrap();
        write_tag_with_attrs(&mut w, "inner", "42", &[("unit", "FT")]).unwrap();
        write_tag_end(&mut w, "outer").unwrap();
        let text = finish(w).unwrap();
        assert!(text.contains("<inner unit=\"FT\">42</inner>"));
    }
}
