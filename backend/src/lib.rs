//! Readers for two linguistically annotated corpus formats: a flat
//! sentence-bank XML dialect and the multi-file TEI layout used by the
//! NKJP corpus. Both produce span-annotated sentence and token samples for
//! training sentence boundary detectors and tokenizers.

pub mod logger;
pub mod nkjp;
pub mod sentence_bank;
pub mod types;

mod xml;
