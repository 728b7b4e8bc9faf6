use super::{table_name, vector_literal};
use crate::RagError;

#[test]
fn vector_literal_format() {
    assert_eq!(vector_literal(&[1.0, -2.5, 0.25]), "[1,-2.5,0.25]");
    assert_eq!(vector_literal(&[]), "[]");
}

#[test]
fn vector_literal_roundtrips_precision() {
    let literal = vector_literal(&[0.123_456_79_f32]);
    let parsed: f32 = literal
        .trim_matches(['[', ']'])
        .parse()
        .expect("literal should parse back");
    assert_eq!(parsed, 0.123_456_79_f32);
}

#[test]
fn provider_collection_names_are_valid_tables() {
    for provider in crate::provider::Provider::ALL {
        assert!(table_name(&provider.collection_name()).is_ok());
    }
}

#[test]
fn table_name_rejects_injection() {
    for bad in ["", "documents; DROP TABLE x", "Documents_Openai", "a b", "x'"] {
        assert!(matches!(table_name(bad), Err(RagError::Database(_))), "{bad}");
    }
}
