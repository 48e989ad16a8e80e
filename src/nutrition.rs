use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::ingredient::{IngredientCatalog, NutritionPer100g};
use crate::catalog::recipe::Recipe;
use crate::matching::scorer::MatchResult;

/// Absolute nutrient amounts for some mass of food.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NutritionalSummary {
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

impl NutritionalSummary {
    fn add_scaled(&mut self, per_100g: &NutritionPer100g, grams: f64) {
        let scale = grams / 100.0;
        let totals = self;
        macro_rules! add_scaled {
            ($($field:ident),*) => {
                $( totals.$field += per_100g.$field * scale; )*
            };
        }
        add_scaled!(calories, protein_g, carbs_g, fat_g, fiber_g);
        for (name, amount) in &per_100g.vitamins {
            *totals.vitamins.entry(name.clone()).or_default() += amount * scale;
        }
        for (name, amount) in &per_100g.minerals {
            *totals.minerals.entry(name.clone()).or_default() += amount * scale;
        }
    }

    fn divided_by(&self, divisor: f64) -> NutritionalSummary {
        let mut out = self.clone();
        macro_rules! divide {
            ($($field:ident),*) => {
                $( out.$field /= divisor; )*
            };
        }
        divide!(calories, protein_g, carbs_g, fat_g, fiber_g);
        out.vitamins.values_mut().for_each(|v| *v /= divisor);
        out.minerals.values_mut().for_each(|v| *v /= divisor);
        out
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RecipeNutritionalProfile {
    pub total_mass_g: f64,
    pub total: NutritionalSummary,
    pub per_serving: NutritionalSummary,
}

impl RecipeNutritionalProfile {
    /// Rounded calories per serving, as shown on recipe cards.
    pub fn calories_per_serving(&self) -> u32 {
        self.per_serving.calories.round().max(0.0) as u32
    }
}

/// Nutrition of the recipe as written, using each requirement's primary ingredient.
pub fn calculate_nutritional_profile(recipe: &Recipe, ingredients: &IngredientCatalog) -> RecipeNutritionalProfile {
    aggregate(
        recipe,
        ingredients,
        recipe.requirements.iter().map(|r| (r.ingredient_id.as_str(), r.quantity_g)),
    )
}

/// Nutrition of the dish the user would actually cook: satisfied requirements
/// use the ingredient that satisfied them, missing ones fall back to the primary.
pub fn calculate_matched_profile(
    recipe: &Recipe,
    result: &MatchResult,
    ingredients: &IngredientCatalog,
) -> RecipeNutritionalProfile {
    let chosen: BTreeMap<&str, &str> = result
        .satisfied
        .iter()
        .map(|s| (s.requirement_id.as_str(), s.satisfied_by.ingredient_id()))
        .collect();
    aggregate(
        recipe,
        ingredients,
        recipe.requirements.iter().map(|r| {
            let id = chosen.get(r.id.as_str()).copied().unwrap_or(r.ingredient_id.as_str());
            (id, r.quantity_g)
        }),
    )
}

fn aggregate<'r>(
    recipe: &Recipe,
    ingredients: &IngredientCatalog,
    parts: impl Iterator<Item = (&'r str, f64)>,
) -> RecipeNutritionalProfile {
    let mut total = NutritionalSummary::default();
    let mut total_mass_g = 0.0;
    for (ingredient_id, grams) in parts {
        if grams <= 0.0 {
            continue;
        }
        if let Some(ingredient) = ingredients.get(ingredient_id) {
            total.add_scaled(&ingredient.nutrition, grams);
            total_mass_g += grams;
        }
    }

    let servings = f64::from(recipe.servings.max(1));
    RecipeNutritionalProfile {
        total_mass_g,
        per_serving: total.divided_by(servings),
        total,
    }
}
