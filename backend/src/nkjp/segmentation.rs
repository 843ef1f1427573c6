//! Segmentation layer of an NKJP-style TEI corpus.
//!
//! Sentences live at the fixed path `teiCorpus/TEI/text/body/p/s`, segments
//! at `s/seg`. A document whose structure does not match that path simply
//! contributes no sentences; only malformed `seg` elements are errors.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nkjp::Pointer;
use crate::types::{FormatError, Result};
use crate::xml;

const SENTENCE_PATH: [&str; 5] = ["teiCorpus", "TEI", "text", "body", "p"];
const SEGMENT_PATH: [&str; 6] = ["teiCorpus", "TEI", "text", "body", "p", "s"];

/// Segments of one sentence, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSegments {
    /// `xml:id` of the `s` element; the corpus may omit it.
    pub sentence_id: Option<String>,
    /// Segment id paired with its resolved pointer.
    pub segments: Vec<(String, Pointer)>,
}

/// A parsed segmentation document. Sentence order is document order: it is
/// the emission order of the assembled sample stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationDocument {
    pub sentences: Vec<SentenceSegments>,
}

impl SegmentationDocument {
    pub fn parse<R: BufRead>(input: R) -> Result<Self> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut sentences: Vec<SentenceSegments> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = xml::name_of(&e)?;
                    if name == "s" && path == SENTENCE_PATH {
                        sentences.push(SentenceSegments {
                            sentence_id: xml::attr_value(&e, "xml:id")?,
                            segments: Vec::new(),
                        });
                    } else if name == "seg" && path == SEGMENT_PATH {
                        let seg = parse_seg(&e)?;
                        if let Some(sentence) = sentences.last_mut() {
                            sentence.segments.push(seg);
                        }
                    }
                    path.push(name);
                }
                Event::Empty(e) => {
                    let name = xml::name_of(&e)?;
                    if name == "s" && path == SENTENCE_PATH {
                        sentences.push(SentenceSegments {
                            sentence_id: xml::attr_value(&e, "xml:id")?,
                            segments: Vec::new(),
                        });
                    } else if name == "seg" && path == SEGMENT_PATH {
                        let seg = parse_seg(&e)?;
                        if let Some(sentence) = sentences.last_mut() {
                            sentence.segments.push(seg);
                        }
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

        debug!("parsed segmentation document with {} sentences", sentences.len());
        Ok(SegmentationDocument { sentences })
    }

    pub fn parse_str(input: &str) -> Result<Self> {
        Self::parse(input.as_bytes())
    }

    pub fn parse_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }
}

fn parse_seg(e: &BytesStart) -> Result<(String, Pointer)> {
    // Coarse structural guard: a seg carries at least its id and corresp.
    // Two unrelated attributes also pass; the specific checks below then
    // report which required attribute is missing.
    if xml::attr_count(e) < 2 {
        return Err(FormatError::new("Missing required attributes in seg node"));
    }

    let id = xml::attr_value(e, "xml:id")?.ok_or_else(|| {
        FormatError::new("Required attribute \"xml:id\" missing in seg node")
    })?;
    let corresp = xml::attr_value(e, "corresp")?.ok_or_else(|| {
        FormatError::new("Required attribute \"corresp\" missing in seg node")
    })?;
    // nkjp:nps marks "no preceding space"; nothing downstream reads it.
    let _nps = xml::attr_value(e, "nkjp:nps")?;

    let pointer = Pointer::parse(&corresp)?;
    Ok((id, pointer))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<teiCorpus xmlns="http://www.tei-c.org/ns/1.0" xmlns:nkjp="http://nkjp.pl/ns/1.0">
 <TEI>
  <text>
   <body>
    <p xml:id="p-1">
     <s xml:id="s-1">
      <seg corresp="text.xml#string-range(p1,0,9)" xml:id="seg-1"/>
      <seg corresp="text.xml#string-range(p1,10,8)" nkjp:nps="true" xml:id="seg-2"/>
     </s>
     <s xml:id="s-2">
      <seg corresp="text.xml#string-range(p1,19,6)" xml:id="seg-3"/>
     </s>
    </p>
   </body>
  </text>
 </TEI>
</teiCorpus>"#;

    #[test]
    fn test_parse_groups_segments_by_sentence() {
        let doc = SegmentationDocument::parse_str(SAMPLE).unwrap();
        assert_eq!(doc.sentences.len(), 2);

        let first = &doc.sentences[0];
        assert_eq!(first.sentence_id.as_deref(), Some("s-1"));
        assert_eq!(first.segments.len(), 2);
        assert_eq!(first.segments[0].0, "seg-1");
        assert_eq!(first.segments[0].1.offset, 0);
        assert_eq!(first.segments[0].1.length, 9);
        assert_eq!(first.segments[1].1.offset, 10);

        let second = &doc.sentences[1];
        assert_eq!(second.sentence_id.as_deref(), Some("s-2"));
        assert_eq!(second.segments.len(), 1);
    }

    #[test]
    fn test_sentence_id_may_be_absent() {
        let xml = r#"<teiCorpus><TEI><text><body><p>
            <s><seg corresp="t#(a,0,2)" xml:id="seg-1"/></s>
        </p></body></text></TEI></teiCorpus>"#;
        let doc = SegmentationDocument::parse_str(xml).unwrap();
        assert_eq!(doc.sentences.len(), 1);
        assert!(doc.sentences[0].sentence_id.is_none());
        assert_eq!(doc.sentences[0].segments.len(), 1);
    }

    #[test]
    fn test_seg_with_single_attribute_fails() {
        let xml = r#"<teiCorpus><TEI><text><body><p>
            <s><seg xml:id="seg-1"/></s>
        </p></body></text></TEI></teiCorpus>"#;
        let err = SegmentationDocument::parse_str(xml).unwrap_err();
        assert!(err.0.contains("Missing required attributes"), "{}", err);
    }

    #[test]
    fn test_two_unrelated_attributes_pass_the_guard_then_fail_specifically() {
        let xml = r#"<teiCorpus><TEI><text><body><p>
            <s><seg xml:id="seg-1" nkjp:nps="true"/></s>
        </p></body></text></TEI></teiCorpus>"#;
        let err = SegmentationDocument::parse_str(xml).unwrap_err();
        assert!(err.0.contains("\"corresp\" missing"), "{}", err);
    }

    #[test]
    fn test_invalid_corresp_fails() {
        let xml = r#"<teiCorpus><TEI><text><body><p>
            <s><seg corresp="nonsense" xml:id="seg-1"/></s>
        </p></body></text></TEI></teiCorpus>"#;
        let err = SegmentationDocument::parse_str(xml).unwrap_err();
        assert!(err.0.contains("corresp"), "{}", err);
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let xml = r#"<teiCorpus><TEI><text><body><p>
            <s xml:id="s&amp;1"><seg corresp="t#(a,0,2)" xml:id="seg-1"/></s>
        </p></body></text></TEI></teiCorpus>"#;
        let doc = SegmentationDocument::parse_str(xml).unwrap();
        assert_eq!(doc.sentences[0].sentence_id.as_deref(), Some("s&1"));
    }

    #[test]
    fn test_invalid_utf8_attribute_is_an_error() {
        // xml:id values become join keys, so a non-UTF-8 value must fail
        // the parse instead of collapsing to an empty string.
        let mut xml = b"<teiCorpus><TEI><text><body><p><s xml:id=\"".to_vec();
        xml.push(0xff);
        xml.extend_from_slice(
            b"\"><seg corresp=\"t#(a,0,2)\" xml:id=\"seg-1\"/></s></p></body></text></TEI></teiCorpus>",
        );
        let err = SegmentationDocument::parse(xml.as_slice()).unwrap_err();
        assert!(err.0.contains("XML error"), "{}", err);
    }

    #[test]
    fn test_non_matching_root_yields_empty_document() {
        let xml = r#"<corpus><TEI><text><body><p>
            <s><seg corresp="t#(a,0,2)" xml:id="seg-1"/></s>
        </p></body></text></TEI></corpus>"#;
        let doc = SegmentationDocument::parse_str(xml).unwrap();
        assert!(doc.sentences.is_empty());
    }
}
