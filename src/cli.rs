use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::ingredient::Month;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ingredient catalog CSV (overrides RECIPE_MATCH_INGREDIENTS)
    #[arg(long, global = true)]
    pub ingredients: Option<PathBuf>,

    /// Recipe catalog JSON (overrides RECIPE_MATCH_RECIPES)
    #[arg(long, global = true)]
    pub recipes: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank recipes against the ingredients on hand
    Rank(RankArgs),
    /// List the best-rated recipes
    Popular {
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// List ingredients grouped by category
    Categories,
    /// List ingredients in season for a month
    Seasonal {
        #[arg(short, long)]
        month: Month,
    },
    /// Show the nutritional profile of a recipe
    Nutrition {
        #[arg(short, long)]
        recipe: String,
    },
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Ingredient ids entered by hand (confidence 1.0)
    #[arg(long = "have", value_delimiter = ',')]
    pub have: Vec<String>,

    /// JSON file mapping ingredient id to confidence or {confidence, quantity_g}
    #[arg(long)]
    pub available: Option<PathBuf>,

    /// Allergen tag to exclude; repeatable
    #[arg(long = "exclude-allergen", value_delimiter = ',')]
    pub exclude_allergens: Vec<String>,

    /// Only keep recipes whose ingredients are in season for --month
    #[arg(long, requires = "month")]
    pub seasonal_only: bool,

    #[arg(long)]
    pub month: Option<Month>,

    #[arg(long)]
    pub threshold: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub page_size: Option<i64>,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub page_offset: i64,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
