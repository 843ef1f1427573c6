//! `corresp` pointer parsing.
//!
//! A `corresp` attribute encodes a cross-document reference in the form
//! `document#(first,anchor,length)`. The first piece of the parenthesized
//! group is carried by the corpus but unused; the second doubles as both
//! the anchor id and the character offset into the target paragraph.

use serde::{Deserialize, Serialize};

use crate::types::{FormatError, Result, Span};

/// A reference into another document's raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    /// Id of the document the pointer targets.
    pub doc: String,
    /// Id of the paragraph (or span) inside the target document.
    pub anchor_id: String,
    /// Character offset into the target paragraph.
    pub offset: usize,
    /// Character length of the referenced text.
    pub length: usize,
    pub space_after: bool,
}

impl Pointer {
    /// Parse a raw `corresp` attribute value.
    pub fn parse(raw: &str) -> Result<Pointer> {
        // The whole attribute string is compared here, and a string in valid
        // pointer form can never equal "yes", so this stays false for every
        // pointer that parses.
        let space_after = raw == "yes";

        let invalid = || {
            FormatError::new(format!(
                "String {} does not appear to be a valid NKJP corresp attribute",
                raw
            ))
        };

        let hash = raw.find('#').ok_or_else(invalid)?;
        let open = raw.find('(').ok_or_else(invalid)?;
        if !raw.ends_with(')') {
            return Err(invalid());
        }

        let doc = raw[..hash].to_string();
        let pieces: Vec<&str> = raw[open + 1..raw.len() - 1].split(',').collect();
        if pieces.len() != 3 {
            return Err(invalid());
        }

        let anchor_id = pieces[1].to_string();
        let offset = pieces[1].parse::<usize>().map_err(|_| {
            FormatError::new(format!(
                "Invalid offset {} in corresp attribute {}",
                pieces[1], raw
            ))
        })?;
        let length = pieces[2].parse::<usize>().map_err(|_| {
            FormatError::new(format!(
                "Invalid length {} in corresp attribute {}",
                pieces[2], raw
            ))
        })?;

        Ok(Pointer {
            doc,
            anchor_id,
            offset,
            length,
            space_after,
        })
    }

    /// The span this pointer selects in its target paragraph, `None` when
    /// `offset + length` does not fit in `usize`. Both fields parse
    /// independently, so their sum can still be out of range.
    pub fn to_span(&self) -> Option<Span> {
        let end = self.offset.checked_add(self.length)?;
        Some(Span::new(self.offset, end))
    }
}
