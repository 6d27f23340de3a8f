use std::collections::HashSet;

use triage_vocab::{
    canonical_vocabulary, recommendation_templates, synonym_map, triage_keywords,
};

#[test]
fn every_synonym_target_is_a_canonical_symptom() {
    let vocab = canonical_vocabulary();
    for entry in synonym_map().entries() {
        assert!(
            vocab.contains(&entry.canonical),
            "synonym '{}' maps to '{}', which is not in the canonical vocabulary",
            entry.phrase,
            entry.canonical
        );
    }
}

#[test]
fn synonym_phrases_are_unique_trimmed_and_lowercase() {
    let mut seen = HashSet::new();
    for entry in synonym_map().entries() {
        assert_eq!(entry.phrase, entry.phrase.trim().to_lowercase());
        assert_eq!(entry.canonical, entry.canonical.trim().to_lowercase());
        assert!(seen.insert(&entry.phrase), "duplicate phrase '{}'", entry.phrase);
    }
}

#[test]
fn audited_collapses_are_preserved() {
    let map = synonym_map();
    assert_eq!(map.canonicalize("chills"), Some("fever"));
    assert_eq!(map.canonicalize("weakness"), Some("fatigue"));
    assert_eq!(map.canonicalize("muscle aches"), Some("body aches"));
    assert_eq!(map.canonicalize("shortness of breath"), Some("difficulty breathing"));
    assert_eq!(map.canonicalize("fever"), None);
}

#[test]
fn canonical_vocabulary_is_lowercase_and_has_no_empty_token() {
    let vocab = canonical_vocabulary();
    assert!(!vocab.is_empty());
    for symptom in vocab.iter() {
        assert!(!symptom.is_empty());
        assert_eq!(symptom, symptom.to_lowercase());
    }
}

#[test]
fn keyword_tables_are_populated_and_lowercase() {
    let kw = triage_keywords();
    for table in [
        &kw.urgency.emergency,
        &kw.urgency.urgent,
        &kw.severity.high,
        &kw.severity.medium,
    ] {
        assert!(!table.terms().is_empty());
        for term in table.terms() {
            assert_eq!(term, &term.to_lowercase());
        }
    }
}

#[test]
fn keyword_match_is_case_insensitive_substring() {
    let kw = triage_keywords();
    assert_eq!(kw.urgency.emergency.first_match("Ischemic STROKE"), Some("stroke"));
    assert_eq!(kw.urgency.urgent.first_match("Klebsiella Pneumoniae"), Some("pneumonia"));
    assert_eq!(kw.urgency.emergency.first_match("Influenza"), None);
}

#[test]
fn every_recommendation_tier_has_text() {
    let rec = recommendation_templates();
    assert!(!rec.emergency.is_empty());
    assert!(!rec.high.is_empty());
    assert!(!rec.routine.is_empty());
    assert_eq!(rec.general.len(), 2);
    assert!(!rec.disclaimer.is_empty());
}
