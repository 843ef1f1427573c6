//! Parser for the sentence-bank XML dialect: tokenized sentences paired with
//! a translation and per-slot inflection variants.
//!
//! The `original` element carries mixed content: `token` elements (with a
//! 1-based `slot` attribute) interleaved with plain text holding the
//! whitespace and punctuation between them. Character spans for every node
//! are reconstructed from that content, with leading and trailing spaces of
//! the plain-text nodes kept out of their spans so punctuation stands alone.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{FormatError, Result, SentenceSample, Span, TokenSample};
use crate::xml;

/// One token's surface form and its inflected variants for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexVariant {
    pub surface: String,
    pub inflections: Vec<String>,
}

/// A tokenized sentence with its source label and translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceBankSentence {
    pub source: String,
    pub translation: String,
    pub original: String,
    pub token_spans: Vec<Span>,
    pub flex_variants: Vec<FlexVariant>,
}

impl SentenceBankSentence {
    /// The sentence as a tokenizer training unit.
    pub fn token_sample(&self) -> TokenSample {
        TokenSample {
            text: self.original.clone(),
            spans: self.token_spans.clone(),
        }
    }
}

/// A parsed sentence-bank document, sentences in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceBankDocument {
    pub sentences: Vec<SentenceBankSentence>,
}

impl SentenceBankDocument {
    /// Parse a sentence-bank document from a reader.
    ///
    /// The root element must be named `sentences` and every element child of
    /// it must be a `sentence` with a `source` attribute. Fails with
    /// [`FormatError`] on the first malformed node.
    pub fn parse<R: BufRead>(input: R) -> Result<Self> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut sentences = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = xml::name_of(&e)?;
                    if !saw_root {
                        if name != "sentences" {
                            return Err(FormatError::new(format!(
                                "Expected root node sentences, found {}",
                                name
                            )));
                        }
                        saw_root = true;
                    } else if name == "sentence" {
                        let source = require_source(&e)?;
                        sentences.push(parse_sentence(&mut reader, source)?);
                    } else {
                        return Err(FormatError::new(format!("Unexpected node: {}", name)));
                    }
                }
                Event::Empty(e) => {
                    let name = xml::name_of(&e)?;
                    if !saw_root {
                        if name != "sentences" {
                            return Err(FormatError::new(format!(
                                "Expected root node sentences, found {}",
                                name
                            )));
                        }
                        saw_root = true;
                    } else if name == "sentence" {
                        // A childless sentence still goes through slot
                        // reconciliation, which rejects it: slot 1 has no token.
                        let source = require_source(&e)?;
                        sentences.push(SentenceState::new().finish(source)?);
                    } else {
                        return Err(FormatError::new(format!("Unexpected node: {}", name)));
                    }
                }
                // Text and comments between sentences are skipped, not errors.
                Event::Text(_) | Event::Comment(_) => {}
                Event::End(_) => {}
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(FormatError::new("Expected root node sentences"));
        }

        debug!("parsed sentence bank document with {} sentences", sentences.len());
        Ok(SentenceBankDocument { sentences })
    }

    pub fn parse_str(input: &str) -> Result<Self> {
        Self::parse(input.as_bytes())
    }

    pub fn parse_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }
}

fn require_source(e: &BytesStart) -> Result<String> {
    xml::attr_value(e, "source")?
        .ok_or_else(|| FormatError::new("Missing required attribute source in sentence node"))
}

/// Accumulated state of one `sentence` element while its children are
/// consumed. Slot reconciliation happens once, in [`SentenceState::finish`].
struct SentenceState {
    translation: String,
    original: ReconstructedOriginal,
    flex_count: usize,
    inflections: HashMap<usize, Vec<String>>,
}

impl SentenceState {
    fn new() -> Self {
        SentenceState {
            translation: String::new(),
            original: ReconstructedOriginal::default(),
            flex_count: 1,
            inflections: HashMap::new(),
        }
    }

    fn finish(mut self, source: String) -> Result<SentenceBankSentence> {
        let mut flex_variants = Vec::with_capacity(self.flex_count);
        for slot in 1..=self.flex_count {
            let surface = self
                .original
                .tokens_by_slot
                .get(&slot)
                .cloned()
                .ok_or_else(|| {
                    FormatError::new(format!("No token recorded for slot {}", slot))
                })?;
            let inflections = self.inflections.remove(&slot).ok_or_else(|| {
                FormatError::new(format!("No inflections recorded for slot {}", slot))
            })?;
            flex_variants.push(FlexVariant {
                surface,
                inflections,
            });
        }

        Ok(SentenceBankSentence {
            source,
            translation: self.translation,
            original: self.original.text,
            token_spans: self.original.spans,
            flex_variants,
        })
    }
}

fn parse_sentence<R: BufRead>(
    reader: &mut Reader<R>,
    source: String,
) -> Result<SentenceBankSentence> {
    let mut state = SentenceState::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = xml::name_of(&e)?;
                match name.as_str() {
                    "original" => {
                        let nodes = collect_original_nodes(reader)?;
                        state.original = reconstruct_original(&nodes);
                        if state.original.max_slot > state.flex_count {
                            state.flex_count = state.original.max_slot;
                        }
                    }
                    "translation" => {
                        state.translation = xml::read_element_text(reader)?;
                    }
                    "flex" => {
                        let slot = parse_slot_attr(&e)?;
                        if slot > state.flex_count {
                            state.flex_count = slot;
                        }
                        let form = xml::read_element_text(reader)?;
                        state.inflections.entry(slot).or_default().push(form);
                    }
                    other => {
                        return Err(FormatError::new(format!("Unexpected node: {}", other)));
                    }
                }
            }
            Event::Empty(e) => {
                let name = xml::name_of(&e)?;
                match name.as_str() {
                    "original" | "translation" => {}
                    "flex" => {
                        let slot = parse_slot_attr(&e)?;
                        if slot > state.flex_count {
                            state.flex_count = slot;
                        }
                        state.inflections.entry(slot).or_default().push(String::new());
                    }
                    other => {
                        return Err(FormatError::new(format!("Unexpected node: {}", other)));
                    }
                }
            }
            Event::Text(_) | Event::Comment(_) => {}
            Event::End(_) => break,
            Event::Eof => {
                return Err(FormatError::new("Unexpected end of document inside sentence"));
            }
            _ => {}
        }
        buf.clear();
    }

    state.finish(source)
}

fn parse_slot_attr(e: &BytesStart) -> Result<usize> {
    let node = xml::name_of(e)?;
    let raw = xml::attr_value(e, "slot")?.ok_or_else(|| {
        FormatError::new(format!("Missing required attribute slot in {} node", node))
    })?;
    let slot: usize = raw
        .parse()
        .map_err(|_| FormatError::new(format!("Invalid slot attribute: {}", raw)))?;
    if slot == 0 {
        return Err(FormatError::new(format!("Invalid slot attribute: {}", raw)));
    }
    Ok(slot)
}

/// One node of an `original` element's mixed content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OriginalNode {
    /// A `token` element with its 1-based slot.
    Token { slot: usize, text: String },
    /// Plain text between tokens: whitespace and punctuation.
    Gap(String),
}

fn collect_original_nodes<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<OriginalNode>> {
    let mut nodes = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = xml::name_of(&e)?;
                if name != "token" {
                    return Err(FormatError::new(format!("Unexpected node: {}", name)));
                }
                let slot = parse_slot_attr(&e)?;
                let text = xml::read_element_text(reader)?;
                nodes.push(OriginalNode::Token { slot, text });
            }
            Event::Empty(e) => {
                let name = xml::name_of(&e)?;
                if name != "token" {
                    return Err(FormatError::new(format!("Unexpected node: {}", name)));
                }
                let slot = parse_slot_attr(&e)?;
                nodes.push(OriginalNode::Token {
                    slot,
                    text: String::new(),
                });
            }
            Event::Text(e) => {
                nodes.push(OriginalNode::Gap(e.unescape()?.into_owned()));
            }
            Event::Comment(_) => {
                return Err(FormatError::new("Unexpected node: #comment"));
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(FormatError::new(
                    "Unexpected end of document inside original element",
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(nodes)
}

/// One sentence's original text with offsets reconstructed from its nodes.
#[derive(Debug, Default)]
struct ReconstructedOriginal {
    text: String,
    spans: Vec<Span>,
    tokens_by_slot: HashMap<usize, String>,
    max_slot: usize,
}

/// Rebuild the original text and one span per node from the ordered mixed
/// content of an `original` element. Token spans cover the token text
/// exactly; gap spans are space-trimmed via [`trim_gap_span`].
fn reconstruct_original(nodes: &[OriginalNode]) -> ReconstructedOriginal {
    let mut out = ReconstructedOriginal {
        max_slot: 1,
        ..ReconstructedOriginal::default()
    };
    let mut cursor = 0usize;

    for node in nodes {
        match node {
            OriginalNode::Token { slot, text } => {
                let len = text.chars().count();
                out.spans.push(Span::new(cursor, cursor + len));
                out.tokens_by_slot.insert(*slot, text.clone());
                if *slot > out.max_slot {
                    out.max_slot = *slot;
                }
                out.text.push_str(text);
                cursor += len;
            }
            OriginalNode::Gap(text) => {
                let len = text.chars().count();
                out.spans.push(trim_gap_span(text, cursor));
                out.text.push_str(text);
                cursor += len;
            }
        }
    }

    out
}

/// Span for an inter-token text node starting at `start`.
///
/// Leading spaces are excluded by advancing the start, trailing spaces by
/// retracting the end; only `' '` counts, never other whitespace. The end
/// never retracts past the node's second character. A node of nothing but
/// spaces collapses to an empty span inside the node, which downstream
/// consumers read as "no token here".
fn trim_gap_span(text: &str, start: usize) -> Span {
    let chars: Vec<char> = text.chars().collect();

    let mut s = start;
    for c in &chars {
        if *c == ' ' {
            s += 1;
        } else {
            break;
        }
    }

    let mut e = start + chars.len();
    for i in (1..chars.len()).rev() {
        if chars[i] == ' ' {
            e -= 1;
        } else {
            break;
        }
    }

    if s > e {
        s = e;
    }
    Span::new(s, e)
}

/// Pull-based stream over a parsed document, one sentence sample per
/// sentence. `reset` rewinds to the first sentence without re-parsing.
pub struct SentenceBankSentenceStream<'a> {
    document: &'a SentenceBankDocument,
    next_sentence: usize,
}

impl<'a> SentenceBankSentenceStream<'a> {
    pub fn new(document: &'a SentenceBankDocument) -> Self {
        SentenceBankSentenceStream {
            document,
            next_sentence: 0,
        }
    }

    /// The next sample, or `None` once every sentence has been read.
    pub fn read(&mut self) -> Option<SentenceSample> {
        let sentence = self.document.sentences.get(self.next_sentence)?;
        self.next_sentence += 1;

        let len = sentence.original.chars().count();
        Some(SentenceSample {
            text: sentence.original.clone(),
            spans: vec![Span::new(0, len)],
        })
    }

    pub fn reset(&mut self) {
        self.next_sentence = 0;
    }
}
