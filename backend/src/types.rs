//! Shared data model for corpus samples.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A half-open character range `[start, end)` into a specific text buffer.
///
/// Offsets count Unicode scalar values, not bytes. Spans taken from the same
/// sentence never overlap, but they are not necessarily contiguous: the gaps
/// hold elided whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One tokenized sentence: its text and the token spans into that text.
/// The unit consumed by tokenizer training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSample {
    pub text: String,
    pub spans: Vec<Span>,
}

/// One sentence-boundary training unit: sentence text and the spans that
/// located it in the source paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSample {
    pub text: String,
    pub spans: Vec<Span>,
}

/// Error raised for any malformed corpus input.
///
/// Structural, referential and numeric failures all surface as this one
/// kind; a parse stops at the first malformed node, with no partial-document
/// recovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FormatError(pub String);

impl FormatError {
    pub fn new(msg: impl Into<String>) -> Self {
        FormatError(msg.into())
    }
}

impl From<quick_xml::Error> for FormatError {
    fn from(e: quick_xml::Error) -> Self {
        FormatError(format!("XML error: {}", e))
    }
}

impl From<std::str::Utf8Error> for FormatError {
    fn from(e: std::str::Utf8Error) -> Self {
        FormatError(format!("Invalid UTF-8 in XML: {}", e))
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError(format!("I/O error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
