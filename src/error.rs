use thiserror::Error;

/// Raised while loading the ingredient or recipe catalog. A catalog that fails
/// here must be fixed upstream; ranking never runs against it.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column '{0}' not found")]
    MissingColumn(&'static str),

    #[error("Invalid value '{value}' for {field} at row {row}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Duplicate ingredient id '{0}'")]
    DuplicateIngredient(String),

    #[error("Duplicate recipe id '{0}'")]
    DuplicateRecipe(String),

    #[error("Recipe '{recipe_id}' declares requirement '{requirement_id}' more than once")]
    DuplicateRequirement {
        recipe_id: String,
        requirement_id: String,
    },

    #[error("Recipe '{recipe_id}' has no requirements")]
    EmptyRecipe { recipe_id: String },

    #[error(
        "Recipe '{recipe_id}', requirement '{requirement_id}' references unknown ingredient '{ingredient_id}'"
    )]
    UnknownIngredient {
        recipe_id: String,
        requirement_id: String,
        ingredient_id: String,
    },

    #[error("Recipe '{recipe_id}', requirement '{requirement_id}' has non-positive weight {weight}")]
    InvalidWeight {
        recipe_id: String,
        requirement_id: String,
        weight: f64,
    },

    #[error("Recipe '{recipe_id}', requirement '{requirement_id}' has invalid quantity {quantity}")]
    InvalidQuantity {
        recipe_id: String,
        requirement_id: String,
        quantity: f64,
    },
}

/// Caller error: the request is rejected before any scoring happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintError {
    #[error("Page size must not be negative (got {0})")]
    NegativePageSize(i64),

    #[error("Page size must be at least 1")]
    ZeroPageSize,

    #[error("Page offset must not be negative (got {0})")]
    NegativePageOffset(i64),

    #[error("Acceptance threshold must be within [0, 1] (got {0})")]
    ThresholdOutOfRange(f64),

    #[error("Seasonal filtering requires a month")]
    MissingMonth,

    #[error("Confidence for '{ingredient_id}' must be within [0, 1] (got {confidence})")]
    ConfidenceOutOfRange {
        ingredient_id: String,
        confidence: f64,
    },
}
