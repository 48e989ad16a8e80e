use serde::Serialize;

use crate::catalog::loader::Catalogs;
use crate::matching::ranking::RankedPage;
use crate::matching::scorer::MatchResult;
use crate::nutrition::calculate_matched_profile;

/// A ranked result joined with the recipe fields a card displays.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCard<'a> {
    pub name: &'a str,
    pub image_url: &'a str,
    pub cook_time_min: u32,
    pub servings: u32,
    pub rating: f32,
    pub calories_per_serving: u32,
    /// Display names of missing ingredients, in recipe order.
    pub missing_names: Vec<&'a str>,
    #[serde(flatten)]
    pub result: &'a MatchResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardPage<'a> {
    pub total: usize,
    pub offset: usize,
    pub cards: Vec<RecipeCard<'a>>,
}

impl<'a> RecipeCard<'a> {
    /// `None` when the result names a recipe the catalog doesn't have.
    pub fn new(result: &'a MatchResult, catalogs: &'a Catalogs) -> Option<Self> {
        let recipe = catalogs.recipes.get(&result.recipe_id)?;
        let missing_names = recipe
            .requirements
            .iter()
            .filter(|r| result.missing.contains(&r.id))
            .filter_map(|r| catalogs.ingredients.get(&r.ingredient_id))
            .map(|i| i.name.as_str())
            .collect();
        let profile = calculate_matched_profile(recipe, result, &catalogs.ingredients);
        Some(Self {
            name: &recipe.name,
            image_url: &recipe.image_url,
            cook_time_min: recipe.cook_time_min,
            servings: recipe.servings,
            rating: recipe.rating,
            calories_per_serving: profile.calories_per_serving(),
            missing_names,
            result,
        })
    }
}

impl<'a> CardPage<'a> {
    pub fn new(page: &'a RankedPage, catalogs: &'a Catalogs) -> Self {
        Self {
            total: page.total,
            offset: page.page.offset,
            cards: page.results.iter().filter_map(|r| RecipeCard::new(r, catalogs)).collect(),
        }
    }
}
