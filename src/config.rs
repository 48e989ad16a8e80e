use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use crate::matching::constraints::{DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_PAGE_SIZE};

pub const INGREDIENTS_ENV_VAR: &str = "RECIPE_MATCH_INGREDIENTS";
pub const RECIPES_ENV_VAR: &str = "RECIPE_MATCH_RECIPES";
pub const THRESHOLD_ENV_VAR: &str = "RECIPE_MATCH_THRESHOLD";
pub const PAGE_SIZE_ENV_VAR: &str = "RECIPE_MATCH_PAGE_SIZE";

const DEFAULT_INGREDIENTS_PATH: &str = "data/ingredients.csv";
const DEFAULT_RECIPES_PATH: &str = "data/recipes.json";

/// Process-level defaults. CLI flags take precedence over these.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub ingredients_path: PathBuf,
    pub recipes_path: PathBuf,
    pub acceptance_threshold: f64,
    pub page_size: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ingredients_path: PathBuf::from(DEFAULT_INGREDIENTS_PATH),
            recipes_path: PathBuf::from(DEFAULT_RECIPES_PATH),
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, against an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            ingredients_path: lookup(INGREDIENTS_ENV_VAR).map(PathBuf::from).unwrap_or(defaults.ingredients_path),
            recipes_path: lookup(RECIPES_ENV_VAR).map(PathBuf::from).unwrap_or(defaults.recipes_path),
            acceptance_threshold: parse_or(&lookup, THRESHOLD_ENV_VAR, defaults.acceptance_threshold),
            page_size: parse_or(&lookup, PAGE_SIZE_ENV_VAR, defaults.page_size),
        }
    }
}

fn parse_or<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}='{}'", key, raw);
            default
        }),
        None => default,
    }
}
