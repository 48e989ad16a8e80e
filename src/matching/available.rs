use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConstraintError;

/// Confidence given to ingredients the user entered by hand.
pub const MANUAL_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_g: Option<f64>,
}

/// Wire form of one entry: either a bare confidence or the full record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityEntry {
    Confidence(f64),
    Full(Availability),
}

/// Snapshot of what the user has on hand, keyed by catalog ingredient id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, AvailabilityEntry>")]
pub struct AvailableIngredientSet {
    entries: BTreeMap<String, Availability>,
}

impl TryFrom<BTreeMap<String, AvailabilityEntry>> for AvailableIngredientSet {
    type Error = ConstraintError;

    fn try_from(raw: BTreeMap<String, AvailabilityEntry>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for (id, entry) in raw {
            let availability = match entry {
                AvailabilityEntry::Confidence(confidence) => Availability { confidence, quantity_g: None },
                AvailabilityEntry::Full(a) => a,
            };
            set.insert(id, availability.confidence, availability.quantity_g)?;
        }
        Ok(set)
    }
}

impl AvailableIngredientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every id with manual-entry confidence and no quantity hint.
    pub fn from_manual<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = ids
            .into_iter()
            .map(|id| (id.into(), Availability { confidence: MANUAL_CONFIDENCE, quantity_g: None }))
            .collect();
        Self { entries }
    }

    /// Adds or replaces an entry. Confidence must be within [0, 1].
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        confidence: f64,
        quantity_g: Option<f64>,
    ) -> Result<(), ConstraintError> {
        let id = id.into();
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ConstraintError::ConfidenceOutOfRange { ingredient_id: id, confidence });
        }
        self.entries.insert(id, Availability { confidence, quantity_g });
        Ok(())
    }

    pub fn insert_manual(&mut self, id: impl Into<String>) {
        self.entries
            .insert(id.into(), Availability { confidence: MANUAL_CONFIDENCE, quantity_g: None });
    }

    pub fn get(&self, id: &str) -> Option<&Availability> {
        self.entries.get(id)
    }

    /// Present with at least `threshold` confidence.
    pub fn accepts(&self, id: &str, threshold: f64) -> bool {
        self.entries.get(id).is_some_and(|a| a.confidence >= threshold)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
