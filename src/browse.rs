//! Catalog listings for the home screen. None of this feeds into matching.

use std::collections::BTreeMap;

use crate::catalog::ingredient::{Ingredient, IngredientCatalog, IngredientCategory, Month};
use crate::catalog::recipe::{Recipe, RecipeCatalog};

/// Best-rated recipes first; quicker recipes win ties, then id.
pub fn popular_recipes(recipes: &RecipeCatalog, limit: usize) -> Vec<&Recipe> {
    let mut sorted: Vec<&Recipe> = recipes.recipes().iter().collect();
    sorted.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| a.cook_time_min.cmp(&b.cook_time_min))
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted.truncate(limit);
    sorted
}

/// Ingredients grouped by category, in category declaration order. Empty
/// categories are left out.
pub fn group_by_category(ingredients: &IngredientCatalog) -> BTreeMap<IngredientCategory, Vec<&Ingredient>> {
    let mut groups: BTreeMap<IngredientCategory, Vec<&Ingredient>> = BTreeMap::new();
    for ingredient in ingredients.iter() {
        groups.entry(ingredient.category).or_default().push(ingredient);
    }
    groups
}

pub fn in_season(ingredients: &IngredientCatalog, month: Month) -> Vec<&Ingredient> {
    ingredients.iter().filter(|i| i.is_in_season(month)).collect()
}
