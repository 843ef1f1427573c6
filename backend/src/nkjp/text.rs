//! Paragraph text layer of an NKJP-style TEI corpus.
//!
//! Divisions and paragraphs live at the fixed path
//! `teiCorpus/TEI/text/group/text/body/div/p`. Paragraph text is recorded
//! verbatim: the segmentation layer's pointers index into it by character
//! offset, so nothing may be trimmed or reflowed.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{FormatError, Result};
use crate::xml;

const TEXT_PATH: [&str; 4] = ["teiCorpus", "TEI", "text", "group"];
const DIV_PATH: [&str; 6] = ["teiCorpus", "TEI", "text", "group", "text", "body"];
const PARA_PATH: [&str; 7] = ["teiCorpus", "TEI", "text", "group", "text", "body", "div"];

/// A parsed text document: division types and raw paragraph text, both
/// keyed by `xml:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocument {
    pub div_types: HashMap<String, String>,
    pub paragraphs: HashMap<String, String>,
}

impl TextDocument {
    pub fn parse<R: BufRead>(input: R) -> Result<Self> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut saw_root = false;

        let mut div_types = HashMap::new();
        let mut paragraphs = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = xml::name_of(&e)?;
                    if !saw_root {
                        if !name.eq_ignore_ascii_case("teiCorpus") {
                            return Err(FormatError::new(format!(
                                "Expected root node teiCorpus, found {}",
                                name
                            )));
                        }
                        saw_root = true;
                    }

                    if name == "text" && path == TEXT_PATH {
                        // The text id keys nothing downstream, but it is
                        // still required to be present.
                        xml::required_attr(&e, "xml:id")?;
                    } else if name == "div" && path == DIV_PATH {
                        let div_type = xml::required_attr(&e, "type")?;
                        let div_id = xml::required_attr(&e, "xml:id")?;
                        div_types.insert(div_id, div_type);
                    } else if name == "p" && path == PARA_PATH {
                        let para_id = xml::required_attr(&e, "xml:id")?;
                        let text = read_paragraph_text(&mut reader, &para_id)?;
                        paragraphs.insert(para_id, text);
                        // read_paragraph_text consumed the matching end tag.
                        buf.clear();
                        continue;
                    }
                    path.push(name);
                }
                Event::Empty(e) => {
                    let name = xml::name_of(&e)?;
                    if !saw_root {
                        if !name.eq_ignore_ascii_case("teiCorpus") {
                            return Err(FormatError::new(format!(
                                "Expected root node teiCorpus, found {}",
                                name
                            )));
                        }
                        saw_root = true;
                    }
                    if name == "text" && path == TEXT_PATH {
                        xml::required_attr(&e, "xml:id")?;
                    } else if name == "div" && path == DIV_PATH {
                        let div_type = xml::required_attr(&e, "type")?;
                        let div_id = xml::required_attr(&e, "xml:id")?;
                        div_types.insert(div_id, div_type);
                    } else if name == "p" && path == PARA_PATH {
                        let para_id = xml::required_attr(&e, "xml:id")?;
                        return Err(FormatError::new(format!(
                            "Unexpected content in p element {}",
                            para_id
                        )));
                    }
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        debug!(
            "parsed text document with {} divisions, {} paragraphs",
            div_types.len(),
            paragraphs.len()
        );
        Ok(TextDocument {
            div_types,
            paragraphs,
        })
    }

    pub fn parse_str(input: &str) -> Result<Self> {
        Self::parse(input.as_bytes())
    }

    pub fn parse_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }
}

/// Text of one `p` element, which must hold exactly one plain-text child.
fn read_paragraph_text<R: BufRead>(reader: &mut Reader<R>, para_id: &str) -> Result<String> {
    let mut text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => {
                if text.is_some() {
                    return Err(FormatError::new(format!(
                        "Unexpected content in p element {}",
                        para_id
                    )));
                }
                text = Some(e.unescape()?.into_owned());
            }
            Event::Start(_) | Event::Empty(_) | Event::Comment(_) => {
                return Err(FormatError::new(format!(
                    "Unexpected content in p element {}",
                    para_id
                )));
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(FormatError::new("Unexpected end of document inside p element"));
            }
            _ => {}
        }
        buf.clear();
    }

    text.ok_or_else(|| {
        FormatError::new(format!("Unexpected content in p element {}", para_id))
    })
}
