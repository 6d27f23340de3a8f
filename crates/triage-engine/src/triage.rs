//! Urgency, severity, and recommendations from a condition label.

use triage_core::models::diagnosis::{SeverityTag, Urgency};
use triage_vocab::keywords::TriageKeywords;
use triage_vocab::recommendations::RecommendationTemplates;

/// Confidence above which a non-keyword condition is at least Medium.
pub const HIGH_CONFIDENCE: f64 = 0.7;
/// Confidence above which a non-keyword condition is Medium rather than Low.
pub const MODERATE_CONFIDENCE: f64 = 0.4;

/// Keyword-driven triage over a condition label. Pure and table-driven.
#[derive(Debug, Clone, Copy)]
pub struct TriageAssessor<'a> {
    keywords: &'a TriageKeywords,
    templates: &'a RecommendationTemplates,
}

impl Default for TriageAssessor<'static> {
    fn default() -> Self {
        Self::new(
            triage_vocab::triage_keywords(),
            triage_vocab::recommendation_templates(),
        )
    }
}

impl<'a> TriageAssessor<'a> {
    pub fn new(keywords: &'a TriageKeywords, templates: &'a RecommendationTemplates) -> Self {
        Self {
            keywords,
            templates,
        }
    }

    /// Keyword tiers take precedence over confidence: an emergency condition
    /// is an emergency however unsure the model is.
    #[allow(clippy::if_same_then_else)]
    pub fn assess_urgency(&self, label: &str, confidence: f64) -> Urgency {
        if self.keywords.urgency.emergency.first_match(label).is_some() {
            Urgency::Emergency
        } else if self.keywords.urgency.urgent.first_match(label).is_some() {
            Urgency::High
        } else if confidence > HIGH_CONFIDENCE {
            // Confidence alone never escalates past Medium.
            Urgency::Medium
        } else if confidence > MODERATE_CONFIDENCE {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }

    pub fn assess_severity(&self, label: &str) -> SeverityTag {
        if self.keywords.severity.high.first_match(label).is_some() {
            SeverityTag::High
        } else if self.keywords.severity.medium.first_match(label).is_some() {
            SeverityTag::Medium
        } else {
            SeverityTag::Low
        }
    }

    /// Tier template followed by the general lines.
    pub fn recommendations(&self, urgency: Urgency) -> Vec<String> {
        let tier = match urgency {
            Urgency::Emergency => &self.templates.emergency,
            Urgency::High => &self.templates.high,
            Urgency::Medium | Urgency::Low => &self.templates.routine,
        };
        tier.iter().chain(&self.templates.general).cloned().collect()
    }

    pub fn disclaimer(&self) -> &str {
        &self.templates.disclaimer
    }
}
