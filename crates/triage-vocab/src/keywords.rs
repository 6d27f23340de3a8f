use serde::Deserialize;

/// An ordered list of lowercase keywords matched as substrings.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable(Vec<String>);

impl KeywordTable {
    pub fn new(terms: Vec<String>) -> Self {
        Self(terms.into_iter().map(|t| t.to_lowercase()).collect())
    }

    /// First keyword (in table order) contained in `text`, ignoring case.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.0
            .iter()
            .find(|term| haystack.contains(term.as_str()))
            .map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrgencyKeywords {
    pub emergency: KeywordTable,
    pub urgent: KeywordTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeverityKeywords {
    pub high: KeywordTable,
    pub medium: KeywordTable,
}

/// Keyword tables matched against condition labels. Urgency and severity
/// are curated separately: a condition can be serious without needing
/// emergency care, and the two tables are allowed to disagree.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageKeywords {
    pub version: u32,
    pub urgency: UrgencyKeywords,
    pub severity: SeverityKeywords,
}
