//! Readers for the TEI-based NKJP corpus layout: the segmentation layer,
//! the paragraph text layer, and the join that materializes sentence
//! samples from the two.
//!
//! The layers live in separate XML documents and reference each other only
//! through `corresp` pointer strings, so assembly is an explicit join over
//! two independently owned documents.

pub mod pointer;
pub mod sample_stream;
pub mod segmentation;
pub mod text;

pub use pointer::Pointer;
pub use sample_stream::SentenceSampleStream;
pub use segmentation::SegmentationDocument;
pub use text::TextDocument;
