use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::ingredient::{normalize_tag, Month};
use crate::error::ConstraintError;

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Caller-supplied request options, as received. Page fields are signed so a
/// negative value can be reported instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub excluded_allergens: BTreeSet<String>,
    pub seasonal_only: bool,
    /// Month the seasonal filter checks against. Required when `seasonal_only` is set.
    pub month: Option<Month>,
    pub acceptance_threshold: f64,
    pub page_size: i64,
    pub page_offset: i64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            excluded_allergens: BTreeSet::new(),
            seasonal_only: false,
            month: None,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
            page_offset: 0,
        }
    }
}

/// The scoring half of validated constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPolicy {
    /// Lower-cased allergen tags
    pub excluded_allergens: BTreeSet<String>,
    /// Set only when seasonal filtering is on.
    pub season: Option<Month>,
    pub acceptance_threshold: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            excluded_allergens: BTreeSet::new(),
            season: None,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

/// Window into the ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub offset: usize,
    pub size: usize,
}

impl Page {
    pub fn next(&self) -> Page {
        Page { offset: self.offset.saturating_add(self.size), size: self.size }
    }
}

impl Constraints {
    pub fn excluding(mut self, allergen: &str) -> Self {
        self.excluded_allergens.insert(allergen.to_string());
        self
    }

    pub fn seasonal(mut self, month: Month) -> Self {
        self.seasonal_only = true;
        self.month = Some(month);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    pub fn with_page(mut self, offset: i64, size: i64) -> Self {
        self.page_offset = offset;
        self.page_size = size;
        self
    }

    /// Checks every field and splits the request into scoring policy and page window.
    pub fn validate(&self) -> Result<(MatchPolicy, Page), ConstraintError> {
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err(ConstraintError::ThresholdOutOfRange(self.acceptance_threshold));
        }
        if self.page_size < 0 {
            return Err(ConstraintError::NegativePageSize(self.page_size));
        }
        if self.page_size == 0 {
            return Err(ConstraintError::ZeroPageSize);
        }
        if self.page_offset < 0 {
            return Err(ConstraintError::NegativePageOffset(self.page_offset));
        }
        let season = match (self.seasonal_only, self.month) {
            (true, None) => return Err(ConstraintError::MissingMonth),
            (true, month) => month,
            (false, _) => None,
        };

        let policy = MatchPolicy {
            excluded_allergens: self.excluded_allergens.iter().map(|a| normalize_tag(a)).collect(),
            season,
            acceptance_threshold: self.acceptance_threshold,
        };
        // Both values are non-negative here; saturate on 32-bit targets.
        let page = Page {
            offset: usize::try_from(self.page_offset).unwrap_or(usize::MAX),
            size: usize::try_from(self.page_size).unwrap_or(usize::MAX),
        };
        Ok((policy, page))
    }
}
