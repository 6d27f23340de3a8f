use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::demographics::{Severity, Sex};

/// Age assumed when the caller omits it.
pub const DEFAULT_AGE: u32 = 30;

/// Inference request as received on the wire. Every field is optional here
/// so that missing values surface as [`ValidationError`]s rather than
/// deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    #[serde(default)]
    pub age: Option<AgeInput>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    /// Older clients send `gender`. Accepted when `sex` is absent or agrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Opaque caller identifier, only ever logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Browser forms frequently send the age as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
}

/// A request that passed boundary validation. Only this type reaches the
/// inference pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub age: u32,
    pub symptoms: String,
    pub severity: Severity,
    pub sex: Sex,
}

impl DiagnosisRequest {
    pub fn new(age: i64, symptoms: &str, severity: &str, sex: &str) -> Self {
        Self {
            age: Some(AgeInput::Number(age)),
            symptoms: Some(symptoms.to_string()),
            severity: Some(severity.to_string()),
            sex: Some(sex.to_string()),
            gender: None,
            user_id: None,
        }
    }

    /// Check the request in a fixed order: symptoms, sex, severity, age.
    /// The first problem found is returned.
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let symptoms = self
            .symptoms
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingSymptoms)?;

        let sex = self.resolve_sex()?;

        let severity = self
            .severity
            .as_deref()
            .ok_or(ValidationError::MissingSeverity)?
            .parse::<Severity>()?;

        let age = match &self.age {
            None => DEFAULT_AGE,
            Some(age) => parse_age(age)?,
        };

        Ok(ValidatedRequest {
            age,
            symptoms: symptoms.to_string(),
            severity,
            sex,
        })
    }

    fn resolve_sex(&self) -> Result<Sex, ValidationError> {
        match (self.sex.as_deref(), self.gender.as_deref()) {
            (None, None) => Err(ValidationError::MissingSex),
            (Some(value), None) | (None, Some(value)) => value.parse(),
            (Some(sex), Some(gender)) => {
                let parsed = sex.parse::<Sex>()?;
                if gender.parse::<Sex>()? != parsed {
                    return Err(ValidationError::ConflictingSex {
                        sex: sex.to_string(),
                        gender: gender.to_string(),
                    });
                }
                Ok(parsed)
            }
        }
    }
}

fn parse_age(input: &AgeInput) -> Result<u32, ValidationError> {
    match input {
        AgeInput::Number(n) => {
            u32::try_from(*n).map_err(|_| ValidationError::InvalidAge(n.to_string()))
        }
        AgeInput::Text(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidAge(text.clone())),
    }
}
