pub mod ingredient;
pub mod loader;
pub mod recipe;

pub use ingredient::{Ingredient, IngredientCatalog, IngredientCategory, Month, NutritionPer100g};
pub use loader::{load_catalogs, load_ingredient_catalog, load_recipe_catalog, Catalogs};
pub use recipe::{Recipe, RecipeCatalog, Requirement};
