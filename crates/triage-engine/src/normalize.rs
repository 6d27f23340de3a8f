//! Free-text symptoms to a fixed list of canonical slots.

use tracing::debug;
use triage_core::models::symptom::{SymptomSlotList, SymptomToken, SLOT_COUNT};
use triage_vocab::synonyms::SynonymMap;

/// Output of [`SymptomNormalizer::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSymptoms {
    pub slots: SymptomSlotList,
    /// Non-empty phrases beyond the last slot, which were dropped.
    pub truncated: usize,
}

/// Splits a comma-separated symptom string and canonicalizes each phrase.
///
/// Positions are preserved: an empty phrase (`"fever,,cough"`) keeps its
/// slot as an empty token, because the categorical models were trained on
/// positional slots.
#[derive(Debug, Clone, Copy)]
pub struct SymptomNormalizer<'a> {
    synonyms: &'a SynonymMap,
}

impl Default for SymptomNormalizer<'static> {
    fn default() -> Self {
        Self::new(triage_vocab::synonym_map())
    }
}

impl<'a> SymptomNormalizer<'a> {
    pub fn new(synonyms: &'a SynonymMap) -> Self {
        Self { synonyms }
    }

    /// Never fails. Input beyond six phrases is dropped and counted.
    pub fn normalize(&self, text: &str) -> NormalizedSymptoms {
        let phrases: Vec<String> = text
            .split(',')
            .map(|p| p.trim().to_lowercase())
            .collect();

        let truncated = phrases
            .iter()
            .skip(SLOT_COUNT)
            .filter(|p| !p.is_empty())
            .count();
        if truncated > 0 {
            debug!(truncated, "dropping symptoms beyond slot capacity");
        }

        let tokens = phrases.into_iter().take(SLOT_COUNT).map(|phrase| {
            match self.synonyms.canonicalize(&phrase) {
                Some(canonical) => {
                    debug!(phrase = %phrase, canonical, "mapped symptom synonym");
                    SymptomToken::new(canonical)
                }
                None => SymptomToken::new(phrase),
            }
        });

        NormalizedSymptoms {
            slots: SymptomSlotList::from_tokens(tokens),
            truncated,
        }
    }
}
