use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Closed set of ingredient categories. Only used for grouping in listings;
/// matching never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Vegetable,
    Fruit,
    Meat,
    Dairy,
    Grain,
    Legume,
    Herb,
    Spice,
    Other,
}

impl IngredientCategory {
    /// All categories in display order
    pub const ALL: &'static [IngredientCategory] = &[
        IngredientCategory::Vegetable,
        IngredientCategory::Fruit,
        IngredientCategory::Meat,
        IngredientCategory::Dairy,
        IngredientCategory::Grain,
        IngredientCategory::Legume,
        IngredientCategory::Herb,
        IngredientCategory::Spice,
        IngredientCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Vegetable => "vegetable",
            IngredientCategory::Fruit => "fruit",
            IngredientCategory::Meat => "meat",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Grain => "grain",
            IngredientCategory::Legume => "legume",
            IngredientCategory::Herb => "herb",
            IngredientCategory::Spice => "spice",
            IngredientCategory::Other => "other",
        }
    }
}

impl FromStr for IngredientCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        IngredientCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown ingredient category '{}'", s))
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: &'static [Month] = &[
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn from_number(n: u8) -> Option<Self> {
        Month::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }
}

/// Accepts full English names (any case), three-letter abbreviations, or 1-12.
impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if let Ok(n) = wanted.parse::<u8>() {
            return Month::from_number(n).ok_or_else(|| format!("month number {} out of range", n));
        }
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted || (wanted.len() == 3 && m.as_str().starts_with(&wanted)))
            .ok_or_else(|| format!("unknown month '{}'", s))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrition per 100g of an ingredient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionPer100g {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vitamins: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub minerals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub category: IngredientCategory,
    pub nutrition: NutritionPer100g,
    pub serving_size_g: f64,
    /// Lower-cased allergen tags
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    /// Months the ingredient is in season. Empty means all year.
    #[serde(default)]
    pub seasonality: BTreeSet<Month>,
}

impl Ingredient {
    pub fn is_in_season(&self, month: Month) -> bool {
        self.seasonality.is_empty() || self.seasonality.contains(&month)
    }

    /// First allergen of this ingredient that appears in `excluded`, if any.
    pub fn excluded_allergen<'a>(&'a self, excluded: &BTreeSet<String>) -> Option<&'a str> {
        self.allergens
            .iter()
            .find(|tag| excluded.contains(tag.as_str()))
            .map(String::as_str)
    }
}

/// Allergen tags are compared trimmed and lower-cased.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Read-only lookup of canonical ingredients keyed by id.
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    ingredients: BTreeMap<String, Ingredient>,
}

impl IngredientCatalog {
    pub fn new(ingredients: Vec<Ingredient>) -> Result<Self, CatalogError> {
        let mut by_id = BTreeMap::new();
        for mut ingredient in ingredients {
            ingredient.allergens = ingredient.allergens.iter().map(|a| normalize_tag(a)).collect();
            if by_id.contains_key(&ingredient.id) {
                return Err(CatalogError::DuplicateIngredient(ingredient.id));
            }
            by_id.insert(ingredient.id.clone(), ingredient);
        }
        Ok(Self { ingredients: by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Ingredient> {
        self.ingredients.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ingredients.contains_key(id)
    }

    /// Iterates ingredients in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.values()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}
