use anyhow::{Context, Result};
use recipe_match::card::CardPage;
use recipe_match::catalog::loader::{parse_ingredient_catalog, parse_recipe_catalog, Catalogs};
use recipe_match::cli::{parse_args, Command, RankArgs};
use recipe_match::config::EngineConfig;
use recipe_match::matching::{AvailableIngredientSet, Constraints, RankingEngine};
use recipe_match::{browse, nutrition};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::info;

async fn load_catalogs(ingredients_path: &Path, recipes_path: &Path) -> Result<Catalogs> {
    let ingredients_csv = fs::read_to_string(ingredients_path)
        .await
        .with_context(|| format!("Failed to read ingredient catalog '{}'", ingredients_path.display()))?;
    let ingredients = parse_ingredient_catalog(&ingredients_csv)
        .with_context(|| format!("Invalid ingredient catalog '{}'", ingredients_path.display()))?;

    let recipes_json = fs::read_to_string(recipes_path)
        .await
        .with_context(|| format!("Failed to read recipe catalog '{}'", recipes_path.display()))?;
    let recipes = parse_recipe_catalog(&recipes_json, &ingredients)
        .with_context(|| format!("Invalid recipe catalog '{}'", recipes_path.display()))?;

    info!("Catalogs ready: {} ingredients, {} recipes", ingredients.len(), recipes.len());
    Ok(Catalogs { ingredients, recipes })
}

async fn build_available_set(args: &RankArgs) -> Result<AvailableIngredientSet> {
    let mut available = match &args.available {
        Some(path) => {
            let json = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read available ingredients '{}'", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Invalid available ingredients '{}'", path.display()))?
        }
        None => AvailableIngredientSet::new(),
    };
    for id in &args.have {
        available.insert_manual(id.trim());
    }
    Ok(available)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let config = EngineConfig::from_env();
    let ingredients_path = cli.ingredients.unwrap_or(config.ingredients_path);
    let recipes_path = cli.recipes.unwrap_or(config.recipes_path);

    let catalogs = load_catalogs(&ingredients_path, &recipes_path).await?;

    match cli.command {
        Command::Rank(args) => {
            let available = build_available_set(&args).await?;
            let constraints = Constraints {
                excluded_allergens: args.exclude_allergens.iter().cloned().collect(),
                seasonal_only: args.seasonal_only,
                month: args.month,
                acceptance_threshold: args.threshold.unwrap_or(config.acceptance_threshold),
                page_size: args.page_size.unwrap_or(config.page_size),
                page_offset: args.page_offset,
            };
            let page = RankingEngine::new(&catalogs)
                .rank(&available, &constraints)
                .context("Rejected ranking request")?;
            info!("{} of {} qualifying recipes shown", page.results.len(), page.total);
            print_json(&CardPage::new(&page, &catalogs))?;
        }
        Command::Popular { limit } => {
            print_json(&browse::popular_recipes(&catalogs.recipes, limit))?;
        }
        Command::Categories => {
            print_json(&browse::group_by_category(&catalogs.ingredients))?;
        }
        Command::Seasonal { month } => {
            print_json(&browse::in_season(&catalogs.ingredients, month))?;
        }
        Command::Nutrition { recipe } => {
            let found = catalogs
                .recipes
                .get(&recipe)
                .with_context(|| format!("No recipe with id '{}'", recipe))?;
            print_json(&nutrition::calculate_nutritional_profile(found, &catalogs.ingredients))?;
        }
    }

    Ok(())
}
