//! Pull-based assembly of sentence samples from the segmentation and text
//! layers.
//!
//! The stream borrows both documents read-only and owns nothing but its
//! position, so resetting it rewinds the iteration without touching any
//! source XML.

use crate::nkjp::{SegmentationDocument, TextDocument};
use crate::types::{FormatError, Result, SentenceSample, Span};

/// Produces one [`SentenceSample`] per segmentation sentence by resolving
/// each segment pointer against the text document's paragraphs.
pub struct SentenceSampleStream<'a> {
    segmentation: &'a SegmentationDocument,
    text: &'a TextDocument,
    next_sentence: usize,
}

impl<'a> SentenceSampleStream<'a> {
    pub fn new(segmentation: &'a SegmentationDocument, text: &'a TextDocument) -> Self {
        SentenceSampleStream {
            segmentation,
            text,
            next_sentence: 0,
        }
    }

    /// The next sample, or `Ok(None)` once every sentence has been read.
    ///
    /// A pointer whose anchor has no paragraph, or whose span leaves its
    /// paragraph, is a [`FormatError`], never silently skipped.
    pub fn read(&mut self) -> Result<Option<SentenceSample>> {
        let Some(sentence) = self.segmentation.sentences.get(self.next_sentence) else {
            return Ok(None);
        };
        self.next_sentence += 1;

        let mut text = String::new();
        let mut spans = Vec::with_capacity(sentence.segments.len());

        for (seg_id, pointer) in &sentence.segments {
            let paragraph = self.text.paragraphs.get(&pointer.anchor_id).ok_or_else(|| {
                FormatError::new(format!(
                    "Segment {} points at unknown paragraph {}",
                    seg_id, pointer.anchor_id
                ))
            })?;

            // An overflowing offset + length can never land inside a
            // paragraph, so it gets the same referential error as a span
            // that leaves one.
            let span = pointer.to_span().ok_or_else(|| {
                FormatError::new(format!(
                    "Segment {} spans {}+{} outside paragraph {}",
                    seg_id, pointer.offset, pointer.length, pointer.anchor_id
                ))
            })?;
            let slice = slice_chars(paragraph, span).ok_or_else(|| {
                FormatError::new(format!(
                    "Segment {} spans {}..{} outside paragraph {}",
                    seg_id, span.start, span.end, pointer.anchor_id
                ))
            })?;

            text.push_str(slice);
            spans.push(span);
        }

        Ok(Some(SentenceSample { text, spans }))
    }

    /// Rewind to the first sentence. Re-pulling after a reset reproduces
    /// the identical sample sequence.
    pub fn reset(&mut self) {
        self.next_sentence = 0;
    }
}

/// Slice `s` by character positions, `None` when the range leaves the string.
fn slice_chars(s: &str, span: Span) -> Option<&str> {
    let start = byte_offset(s, span.start)?;
    let end = byte_offset(s, span.end)?;
    Some(&s[start..end])
}

/// Byte offset of the `chars`-th character, or of the end for `chars` equal
/// to the char count.
fn byte_offset(s: &str, chars: usize) -> Option<usize> {
    if chars == 0 {
        return Some(0);
    }
    s.char_indices()
        .nth(chars - 1)
        .map(|(i, c)| i + c.len_utf8())
}
