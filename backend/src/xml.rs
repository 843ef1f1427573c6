//! Small helpers over quick-xml events shared by the corpus parsers.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::types::{FormatError, Result};

/// Element name as UTF-8.
pub(crate) fn name_of(e: &BytesStart) -> Result<String> {
    Ok(std::str::from_utf8(e.name().as_ref())?.to_string())
}

/// Get an attribute value from an element, `Ok(None)` when absent.
///
/// The value is unescaped; a malformed attribute or one that is not valid
/// UTF-8 is an error, never an empty string, since these values end up as
/// join keys.
pub(crate) fn attr_value(e: &BytesStart, attr_name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == attr_name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Number of well-formed attributes on an element.
pub(crate) fn attr_count(e: &BytesStart) -> usize {
    e.attributes().filter_map(|a| a.ok()).count()
}

/// Get a required attribute value, with the TEI readers' error wording.
pub(crate) fn required_attr(e: &BytesStart, attr_name: &str) -> Result<String> {
    let node = name_of(e)?;
    if attr_count(e) == 0 {
        return Err(FormatError::new(format!(
            "Missing required attributes in node {}",
            node
        )));
    }
    attr_value(e, attr_name)?.ok_or_else(|| {
        FormatError::new(format!(
            "Required attribute \"{}\" missing in node {}",
            attr_name, node
        ))
    })
}

/// Concatenated text content up to the matching end tag.
///
/// Whitespace is kept verbatim: character offsets are computed from the
/// returned text, so nothing may be trimmed here.
pub(crate) fn read_element_text<R: BufRead>(reader: &mut Reader<R>) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => return Err(FormatError::new("Unexpected end of document")),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
