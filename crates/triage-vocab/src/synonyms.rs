use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// One row of the synonym table.
#[derive(Debug, Clone, Deserialize)]
pub struct SynonymEntry {
    /// Lowercase phrase as a user might type it.
    pub phrase: String,
    /// Canonical symptom it collapses to.
    pub canonical: String,
    /// Audit grouping only (e.g. "respiratory"); not used for lookup.
    pub group: String,
}

/// Whole-phrase synonym lookup. Matching is exact on the already trimmed,
/// lowercased phrase; there is no partial or fuzzy matching.
///
/// Some mappings merge clinically distinct symptoms (`weakness` → `fatigue`,
/// `chills` → `fever`). They are reproduced exactly as the classifiers were
/// trained with them and are listed for domain review, not corrected here.
#[derive(Debug, Clone)]
pub struct SynonymMap {
    version: u32,
    entries: Vec<SynonymEntry>,
    lookup: HashMap<String, usize>,
}

impl SynonymMap {
    pub fn from_entries(version: u32, entries: Vec<SynonymEntry>) -> Self {
        let lookup = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.phrase.clone(), i))
            .collect();
        Self {
            version,
            entries,
            lookup,
        }
    }

    /// Canonical form of `phrase`, if the table has one.
    pub fn canonicalize(&self, phrase: &str) -> Option<&str> {
        self.lookup
            .get(phrase)
            .map(|&i| self.entries[i].canonical.as_str())
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
struct SynonymFile {
    version: u32,
    mappings: Vec<SynonymEntry>,
}

impl<'de> Deserialize<'de> for SynonymMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let file = SynonymFile::deserialize(deserializer)?;
        Ok(SynonymMap::from_entries(file.version, file.mappings))
    }
}
