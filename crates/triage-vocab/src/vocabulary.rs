use std::collections::BTreeSet;

use serde::Deserialize;

/// The set of canonical symptom tokens the training data was generated
/// from. Used to audit the synonym table; model bundles carry their own
/// per-partition vocabularies.
#[derive(Debug, Clone, Deserialize)]
pub struct CanonicalVocabulary {
    pub version: u32,
    symptoms: BTreeSet<String>,
}

impl CanonicalVocabulary {
    pub fn contains(&self, symptom: &str) -> bool {
        self.symptoms.contains(symptom)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symptoms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }
}
