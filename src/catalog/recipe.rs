use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use super::ingredient::IngredientCatalog;
use crate::error::CatalogError;

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// One ingredient slot of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Defaults to the primary ingredient id when left empty.
    #[serde(default)]
    pub id: String,
    pub ingredient_id: String,
    /// Acceptable replacements, most preferred first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substitutes: Vec<String>,
    #[serde(default)]
    pub quantity_g: f64,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Requirement {
    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_WEIGHT)
    }

    /// Primary ingredient followed by the substitutes in declared order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.ingredient_id.as_str()).chain(self.substitutes.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub cook_time_min: u32,
    pub servings: u32,
    pub rating: f32,
    pub requirements: Vec<Requirement>,
}

/// Validated, read-only recipe collection, ordered by recipe id.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Checks every recipe against `ingredients` and rejects the whole catalog
    /// on the first integrity problem.
    pub fn new(mut recipes: Vec<Recipe>, ingredients: &IngredientCatalog) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for recipe in recipes.iter_mut() {
            if !seen.insert(recipe.id.clone()) {
                return Err(CatalogError::DuplicateRecipe(recipe.id.clone()));
            }
            if let Err(e) = validate_recipe(recipe, ingredients) {
                warn!("Rejecting recipe catalog: {}", e);
                return Err(e);
            }
        }
        recipes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Self { recipes })
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes
            .binary_search_by(|r| r.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.recipes[idx])
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

fn validate_recipe(recipe: &mut Recipe, ingredients: &IngredientCatalog) -> Result<(), CatalogError> {
    if recipe.requirements.is_empty() {
        return Err(CatalogError::EmptyRecipe { recipe_id: recipe.id.clone() });
    }

    let mut requirement_ids = HashSet::new();
    for requirement in recipe.requirements.iter_mut() {
        if requirement.id.is_empty() {
            requirement.id = requirement.ingredient_id.clone();
        }
        if !requirement_ids.insert(requirement.id.clone()) {
            return Err(CatalogError::DuplicateRequirement {
                recipe_id: recipe.id.clone(),
                requirement_id: requirement.id.clone(),
            });
        }
        if let Some(unknown) = requirement.candidates().find(|id| !ingredients.contains(id)) {
            return Err(CatalogError::UnknownIngredient {
                recipe_id: recipe.id.clone(),
                requirement_id: requirement.id.clone(),
                ingredient_id: unknown.to_string(),
            });
        }
        let weight = requirement.weight();
        if !weight.is_finite() || weight <= 0.0 {
            return Err(CatalogError::InvalidWeight {
                recipe_id: recipe.id.clone(),
                requirement_id: requirement.id.clone(),
                weight,
            });
        }
        if !requirement.quantity_g.is_finite() || requirement.quantity_g < 0.0 {
            return Err(CatalogError::InvalidQuantity {
                recipe_id: recipe.id.clone(),
                requirement_id: requirement.id.clone(),
                quantity: requirement.quantity_g,
            });
        }
    }
    Ok(())
}
