//! triage-vocab
//!
//! Static lookup data for the triage engine. Pure data, no inference logic.
//! Every table lives as a versioned JSON file under `data/` so it can be
//! audited and diffed independently of the code that consumes it; the files
//! are embedded at compile time and parsed once on first use.

pub mod keywords;
pub mod recommendations;
pub mod synonyms;
pub mod vocabulary;

use std::sync::LazyLock;

use keywords::TriageKeywords;
use recommendations::RecommendationTemplates;
use synonyms::SynonymMap;
use vocabulary::CanonicalVocabulary;

static SYNONYMS: LazyLock<SynonymMap> =
    LazyLock::new(|| parse("synonyms.json", include_str!("../data/synonyms.json")));

static VOCABULARY: LazyLock<CanonicalVocabulary> = LazyLock::new(|| {
    parse(
        "canonical_symptoms.json",
        include_str!("../data/canonical_symptoms.json"),
    )
});

static KEYWORDS: LazyLock<TriageKeywords> = LazyLock::new(|| {
    parse(
        "triage_keywords.json",
        include_str!("../data/triage_keywords.json"),
    )
});

static RECOMMENDATIONS: LazyLock<RecommendationTemplates> = LazyLock::new(|| {
    parse(
        "recommendations.json",
        include_str!("../data/recommendations.json"),
    )
});

/// Many-to-one phrase → canonical symptom mapping.
pub fn synonym_map() -> &'static SynonymMap {
    &SYNONYMS
}

/// Canonical symptom vocabulary the classifiers were trained against.
pub fn canonical_vocabulary() -> &'static CanonicalVocabulary {
    &VOCABULARY
}

/// Urgency and severity keyword tables.
pub fn triage_keywords() -> &'static TriageKeywords {
    &KEYWORDS
}

/// Recommendation text per urgency tier, plus the disclaimer.
pub fn recommendation_templates() -> &'static RecommendationTemplates {
    &RECOMMENDATIONS
}

/// Parse an embedded data file.
///
/// # Panics
///
/// Panics if the file is not valid for its table type. The files are
/// compiled into the binary, so a failure here is a packaging bug that the
/// crate's own tests catch.
fn parse<T: serde::de::DeserializeOwned>(name: &str, contents: &str) -> T {
    serde_json::from_str(contents)
        .unwrap_or_else(|e| panic!("embedded data file '{name}' is invalid: {e}"))
}
