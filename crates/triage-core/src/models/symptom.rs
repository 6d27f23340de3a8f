use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of symptom slots every request is normalized to.
pub const SLOT_COUNT: usize = 6;

/// A canonical, lowercase symptom token. The empty string is the
/// distinguished "no symptom" token used for padding and for vocabulary
/// misses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomToken(String);

impl SymptomToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymptomToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exactly [`SLOT_COUNT`] symptom tokens. Slot order is preserved from the
/// input and is significant for categorical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSlotList {
    slots: [SymptomToken; SLOT_COUNT],
}

impl SymptomSlotList {
    /// Build a slot list from tokens in order: missing slots are padded with
    /// the empty token, tokens beyond [`SLOT_COUNT`] are dropped.
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = SymptomToken>,
    {
        let mut slots: [SymptomToken; SLOT_COUNT] = Default::default();
        for (slot, token) in slots.iter_mut().zip(tokens) {
            *slot = token;
        }
        Self { slots }
    }

    pub fn empty() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    pub fn slots(&self) -> &[SymptomToken; SLOT_COUNT] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomToken> {
        self.slots.iter()
    }

    /// Tokens that carry a symptom, in slot order.
    pub fn present(&self) -> impl Iterator<Item = &SymptomToken> {
        self.slots.iter().filter(|t| !t.is_empty())
    }

    pub fn is_all_empty(&self) -> bool {
        self.slots.iter().all(SymptomToken::is_empty)
    }
}
