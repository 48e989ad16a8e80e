pub mod browse;
pub mod card;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod nutrition;

pub use catalog::{Catalogs, IngredientCatalog, RecipeCatalog};
pub use error::{CatalogError, ConstraintError};
pub use matching::{AvailableIngredientSet, Constraints, MatchResult, RankedPage, RankingEngine};
