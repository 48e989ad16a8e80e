use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::info;

use super::ingredient::{Ingredient, IngredientCatalog, IngredientCategory, Month, NutritionPer100g};
use super::recipe::{Recipe, RecipeCatalog};
use crate::error::CatalogError;

// Expected column headers
const ID_COL: &str = "id";
const NAME_COL: &str = "name";
const CATEGORY_COL: &str = "category";
const KCAL_COL: &str = "calories";
const PROTEIN_COL: &str = "protein_g";
const CARB_COL: &str = "carbs_g";
const FAT_COL: &str = "fat_g";
const FIBER_COL: &str = "fiber_g";
const SERVING_COL: &str = "serving_size_g";
// Optional columns
const ALLERGENS_COL: &str = "allergens";
const SEASONALITY_COL: &str = "seasonality";
const VITAMINS_COL: &str = "vitamins";
const MINERALS_COL: &str = "minerals";
const IMAGE_COL: &str = "image_url";

/// Separator for list-valued cells, e.g. `gluten;egg` or `june;july`.
const LIST_SEP: char = ';';

/// Both catalogs, loaded and cross-validated.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub ingredients: IngredientCatalog,
    pub recipes: RecipeCatalog,
}

pub fn load_catalogs(ingredients_csv: &Path, recipes_json: &Path) -> Result<Catalogs, CatalogError> {
    let ingredients = load_ingredient_catalog(ingredients_csv)?;
    let recipes = load_recipe_catalog(recipes_json, &ingredients)?;
    Ok(Catalogs { ingredients, recipes })
}

pub fn load_ingredient_catalog(csv_path: &Path) -> Result<IngredientCatalog, CatalogError> {
    let file = std::fs::File::open(csv_path)?;
    let catalog = IngredientCatalog::new(read_ingredients(file)?)?;
    info!("Loaded {} ingredients from {:?}", catalog.len(), csv_path);
    Ok(catalog)
}

pub fn parse_ingredient_catalog(csv_text: &str) -> Result<IngredientCatalog, CatalogError> {
    IngredientCatalog::new(read_ingredients(csv_text.as_bytes())?)
}

pub fn load_recipe_catalog(json_path: &Path, ingredients: &IngredientCatalog) -> Result<RecipeCatalog, CatalogError> {
    let text = std::fs::read_to_string(json_path)?;
    let catalog = parse_recipe_catalog(&text, ingredients)?;
    info!("Loaded {} recipes from {:?}", catalog.len(), json_path);
    Ok(catalog)
}

pub fn parse_recipe_catalog(json_text: &str, ingredients: &IngredientCatalog) -> Result<RecipeCatalog, CatalogError> {
    let recipes: Vec<Recipe> = serde_json::from_str(json_text)?;
    RecipeCatalog::new(recipes, ingredients)
}

struct Columns {
    id: usize,
    name: usize,
    category: usize,
    kcal: usize,
    protein: usize,
    carbs: usize,
    fat: usize,
    fiber: usize,
    serving: usize,
    allergens: Option<usize>,
    seasonality: Option<usize>,
    vitamins: Option<usize>,
    minerals: Option<usize>,
    image: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, CatalogError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(CatalogError::MissingColumn(name));
        Ok(Self {
            id: require(ID_COL)?,
            name: require(NAME_COL)?,
            category: require(CATEGORY_COL)?,
            kcal: require(KCAL_COL)?,
            protein: require(PROTEIN_COL)?,
            carbs: require(CARB_COL)?,
            fat: require(FAT_COL)?,
            fiber: require(FIBER_COL)?,
            serving: require(SERVING_COL)?,
            allergens: find(ALLERGENS_COL),
            seasonality: find(SEASONALITY_COL),
            vitamins: find(VITAMINS_COL),
            minerals: find(MINERALS_COL),
            image: find(IMAGE_COL),
        })
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

fn invalid(row: usize, field: &'static str, value: &str) -> CatalogError {
    CatalogError::InvalidField { row, field, value: value.to_string() }
}

fn parse_f64(record: &StringRecord, idx: usize, row: usize, field: &'static str) -> Result<f64, CatalogError> {
    let raw = cell(record, Some(idx));
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(invalid(row, field, raw)),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_SEP).map(str::trim).filter(|s| !s.is_empty())
}

/// Parses `name=amount` pairs, e.g. `c=13.7;a=0.04`.
fn parse_amounts(raw: &str, row: usize, field: &'static str) -> Result<BTreeMap<String, f64>, CatalogError> {
    split_list(raw)
        .map(|pair| {
            let (name, amount) = pair.split_once('=').ok_or_else(|| invalid(row, field, pair))?;
            let amount = amount.trim().parse::<f64>().map_err(|_| invalid(row, field, pair))?;
            Ok((name.trim().to_string(), amount))
        })
        .collect()
}

fn read_ingredients<R: Read>(reader: R) -> Result<Vec<Ingredient>, CatalogError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?)?;

    let mut ingredients = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let row = row_index + 2;

        let id = cell(&record, Some(columns.id));
        if id.is_empty() {
            return Err(invalid(row, ID_COL, id));
        }
        let raw_category = cell(&record, Some(columns.category));
        let category = raw_category
            .parse::<IngredientCategory>()
            .map_err(|_| invalid(row, CATEGORY_COL, raw_category))?;

        let seasonality = split_list(cell(&record, columns.seasonality))
            .map(|m| m.parse::<Month>().map_err(|_| invalid(row, SEASONALITY_COL, m)))
            .collect::<Result<BTreeSet<_>, _>>()?;

        ingredients.push(Ingredient {
            id: id.to_string(),
            name: cell(&record, Some(columns.name)).to_string(),
            image_url: cell(&record, columns.image).to_string(),
            category,
            nutrition: NutritionPer100g {
                calories: parse_f64(&record, columns.kcal, row, KCAL_COL)?,
                protein_g: parse_f64(&record, columns.protein, row, PROTEIN_COL)?,
                carbs_g: parse_f64(&record, columns.carbs, row, CARB_COL)?,
                fat_g: parse_f64(&record, columns.fat, row, FAT_COL)?,
                fiber_g: parse_f64(&record, columns.fiber, row, FIBER_COL)?,
                vitamins: parse_amounts(cell(&record, columns.vitamins), row, VITAMINS_COL)?,
                minerals: parse_amounts(cell(&record, columns.minerals), row, MINERALS_COL)?,
            },
            serving_size_g: parse_f64(&record, columns.serving, row, SERVING_COL)?,
            allergens: split_list(cell(&record, columns.allergens)).map(str::to_string).collect(),
            seasonality,
        });
    }

    Ok(ingredients)
}
