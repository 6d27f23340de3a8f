use serde::Deserialize;

/// Fixed recommendation text. No free-text generation happens anywhere:
/// a tier selects one template and the general lines are always appended.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationTemplates {
    pub version: u32,
    pub emergency: Vec<String>,
    pub high: Vec<String>,
    /// Used for both the Medium and Low tiers.
    pub routine: Vec<String>,
    pub general: Vec<String>,
    pub disclaimer: String,
}
