use korpus_backend::sentence_bank::{SentenceBankDocument, SentenceBankSentenceStream};

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sentences>
    <sentence source="gd101">
        <original><token slot="1">A</token> <token slot="2">Dhia</token>, <token slot="3">tá</token> <token slot="4">mé</token> <token slot="5">ag</token> <token slot="6">iompar</token> <token slot="7">clainne</token>!</original>
        <translation>God, I am pregnant!</translation>
        <flex slot="1">A</flex>
        <flex slot="2">Dia</flex>
        <flex slot="3">bí</flex>
        <flex slot="4">mé</flex>
        <flex slot="5">ag</flex>
        <flex slot="6">iompar</flex>
        <flex slot="7">clann</flex>
    </sentence>
    <!-- comments between sentences are fine -->
    <sentence source="gd102">
        <original><token slot="1">Tháinig</token> <token slot="2">sé</token>.</original>
        <translation>He came.</translation>
        <flex slot="1">tar</flex>
        <flex slot="2">sé</flex>
    </sentence>
</sentences>"#;

fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end - start).collect()
}

#[test]
fn test_document_order_and_original_text() {
    let doc = SentenceBankDocument::parse_str(SAMPLE).unwrap();
    assert_eq!(doc.sentences.len(), 2);
    assert_eq!(doc.sentences[0].original, "A Dhia, tá mé ag iompar clainne!");
    assert_eq!(doc.sentences[1].original, "Tháinig sé.");
    assert_eq!(doc.sentences[1].source, "gd102");
}

#[test]
fn test_span_round_trip_reproduces_trimmed_nodes() {
    let doc = SentenceBankDocument::parse_str(SAMPLE).unwrap();

    for sentence in &doc.sentences {
        let total = sentence.original.chars().count();
        let mut pieces = Vec::new();
        for span in &sentence.token_spans {
            assert!(span.end <= total);
            pieces.push(char_slice(&sentence.original, span.start, span.end));
        }
        // Every token and every trimmed punctuation piece comes back out;
        // elided whitespace does not.
        let expected: Vec<&str> = vec![
            "A", "", "Dhia", ",", "tá", "", "mé", "", "ag", "", "iompar", "", "clainne", "!",
        ];
        if sentence.source == "gd101" {
            assert_eq!(pieces, expected);
        }
    }
}

#[test]
fn test_spans_monotonic() {
    let doc = SentenceBankDocument::parse_str(SAMPLE).unwrap();
    for sentence in &doc.sentences {
        let mut prev = 0;
        for span in &sentence.token_spans {
            assert!(span.start >= prev, "span starts went backwards");
            prev = span.start;
        }
    }
}

#[test]
fn test_flex_variants_cover_every_token() {
    let doc = SentenceBankDocument::parse_str(SAMPLE).unwrap();
    let second = &doc.sentences[1];
    assert_eq!(second.flex_variants.len(), 2);
    assert_eq!(second.flex_variants[0].surface, "Tháinig");
    assert_eq!(second.flex_variants[0].inflections, vec!["tar".to_string()]);
}

#[test]
fn test_sentence_stream_reset_is_idempotent() {
    let doc = SentenceBankDocument::parse_str(SAMPLE).unwrap();
    let mut stream = SentenceBankSentenceStream::new(&doc);

    let mut first_pass = Vec::new();
    while let Some(sample) = stream.read() {
        first_pass.push(sample);
    }
    assert_eq!(first_pass.len(), 2);

    stream.reset();
    let mut second_pass = Vec::new();
    while let Some(sample) = stream.read() {
        second_pass.push(sample);
    }
    assert_eq!(first_pass, second_pass);
}

#[test]
fn test_samples_serialize_to_json() {
    let doc = SentenceBankDocument::parse_str(SAMPLE).unwrap();
    let sample = doc.sentences[1].token_sample();
    let json = serde_json::to_string(&sample).unwrap();
    assert!(json.contains("\"Tháinig sé.\""), "{}", json);
    assert!(json.contains("\"start\":0"), "{}", json);
}
