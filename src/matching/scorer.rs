use serde::Serialize;
use tracing::debug;

use super::available::AvailableIngredientSet;
use super::constraints::MatchPolicy;
use super::substitution::{resolve_with, SatisfiedBy};
use crate::catalog::ingredient::{IngredientCatalog, Month};
use crate::catalog::recipe::{Recipe, Requirement};

/// Optional requirements count for half their weight.
pub const OPTIONAL_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfiedRequirement {
    pub requirement_id: String,
    pub satisfied_by: SatisfiedBy,
    /// Grams missing when the quantity hint is below what the recipe asks for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_by_g: Option<f64>,
}

/// Why a recipe was excluded outright.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Disqualification {
    Allergen { ingredient_id: String, allergen: String },
    OutOfSeason { ingredient_id: String, month: Month },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub recipe_id: String,
    /// 0-100, rounded half up.
    pub match_percentage: u8,
    /// In recipe order.
    pub satisfied: Vec<SatisfiedRequirement>,
    /// Requirement ids in recipe order.
    pub missing: Vec<String>,
    pub missing_mandatory: usize,
    pub disqualified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disqualification: Option<Disqualification>,
}

/// Scores one recipe against one available-ingredient snapshot. Holds no state
/// besides the catalog reference, so it can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer<'a> {
    ingredients: &'a IngredientCatalog,
}

impl<'a> MatchScorer<'a> {
    pub fn new(ingredients: &'a IngredientCatalog) -> Self {
        Self { ingredients }
    }

    pub fn score(&self, recipe: &Recipe, available: &AvailableIngredientSet, policy: &MatchPolicy) -> MatchResult {
        // Under a season filter, out-of-season ingredients are never picked.
        let usable = |id: &str| match policy.season {
            Some(month) => self.in_season(id, month),
            None => true,
        };
        let resolutions: Vec<Option<SatisfiedBy>> = recipe
            .requirements
            .iter()
            .map(|r| resolve_with(r, available, policy.acceptance_threshold, usable))
            .collect();

        let mut satisfied = Vec::new();
        let mut missing = Vec::new();
        let mut missing_mandatory = 0;
        for (requirement, resolution) in recipe.requirements.iter().zip(&resolutions) {
            match resolution {
                Some(by) => satisfied.push(SatisfiedRequirement {
                    requirement_id: requirement.id.clone(),
                    short_by_g: shortfall(requirement, by, available),
                    satisfied_by: by.clone(),
                }),
                None => {
                    missing.push(requirement.id.clone());
                    if !requirement.optional {
                        missing_mandatory += 1;
                    }
                }
            }
        }

        let disqualification = self
            .allergen_violation(recipe, &resolutions, policy)
            .or_else(|| self.season_violation(recipe, available, policy));

        let match_percentage = match &disqualification {
            Some(reason) => {
                debug!("Recipe '{}' disqualified: {:?}", recipe.id, reason);
                0
            }
            None if missing.is_empty() => 100,
            None => weighted_percentage(&recipe.requirements, &resolutions),
        };

        MatchResult {
            recipe_id: recipe.id.clone(),
            match_percentage,
            satisfied,
            missing,
            missing_mandatory,
            disqualified: disqualification.is_some(),
            disqualification,
        }
    }

    /// First mandatory requirement whose chosen ingredient carries an excluded allergen.
    fn allergen_violation(
        &self,
        recipe: &Recipe,
        resolutions: &[Option<SatisfiedBy>],
        policy: &MatchPolicy,
    ) -> Option<Disqualification> {
        if policy.excluded_allergens.is_empty() {
            return None;
        }
        recipe
            .requirements
            .iter()
            .zip(resolutions)
            .filter(|(r, _)| !r.optional)
            .filter_map(|(_, resolution)| resolution.as_ref())
            .find_map(|by| {
                let ingredient = self.ingredients.get(by.ingredient_id())?;
                let allergen = ingredient.excluded_allergen(&policy.excluded_allergens)?;
                Some(Disqualification::Allergen {
                    ingredient_id: ingredient.id.clone(),
                    allergen: allergen.to_string(),
                })
            })
    }

    /// Any requirement whose primary is out of season is only acceptable when an
    /// in-season substitute is on hand. Optional garnishes are held to the same rule.
    fn season_violation(
        &self,
        recipe: &Recipe,
        available: &AvailableIngredientSet,
        policy: &MatchPolicy,
    ) -> Option<Disqualification> {
        let month = policy.season?;
        recipe.requirements.iter().find_map(|requirement| {
            if self.in_season(&requirement.ingredient_id, month) {
                return None;
            }
            let covered = requirement
                .substitutes
                .iter()
                .any(|s| self.in_season(s, month) && available.accepts(s, policy.acceptance_threshold));
            (!covered).then(|| Disqualification::OutOfSeason {
                ingredient_id: requirement.ingredient_id.clone(),
                month,
            })
        })
    }

    fn in_season(&self, id: &str, month: Month) -> bool {
        self.ingredients.get(id).is_some_and(|i| i.is_in_season(month))
    }
}

fn shortfall(requirement: &Requirement, by: &SatisfiedBy, available: &AvailableIngredientSet) -> Option<f64> {
    let have = available.get(by.ingredient_id())?.quantity_g?;
    let short = requirement.quantity_g - have;
    (short > 0.0).then_some(short)
}

fn weighted_percentage(requirements: &[Requirement], resolutions: &[Option<SatisfiedBy>]) -> u8 {
    let mut earned = 0.0;
    let mut total = 0.0;
    for (requirement, resolution) in requirements.iter().zip(resolutions) {
        let factor = if requirement.optional { OPTIONAL_FACTOR } else { 1.0 };
        let weight = requirement.weight() * factor;
        total += weight;
        if resolution.is_some() {
            earned += weight;
        }
    }
    if total <= 0.0 {
        return 0;
    }
    round_half_up(100.0 * earned / total)
}

/// Nudged by a tiny epsilon so exact halves that land a hair low in binary
/// still round up.
fn round_half_up(value: f64) -> u8 {
    (value + 0.5 + 1e-9).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ingredient::{Ingredient, IngredientCategory, NutritionPer100g};
    use std::collections::BTreeSet;

    fn ingredient(id: &str, allergens: &[&str], seasonality: &[Month]) -> Ingredient {
        Ingredient {
            id: id.into(),
            name: id.into(),
            image_url: String::new(),
            category: IngredientCategory::Other,
            nutrition: NutritionPer100g::default(),
            serving_size_g: 100.0,
            allergens: allergens.iter().map(|a| a.to_string()).collect(),
            seasonality: seasonality.iter().copied().collect(),
        }
    }

    fn requirement(id: &str, weight: f64, substitutes: &[&str], optional: bool) -> Requirement {
        Requirement {
            id: id.into(),
            ingredient_id: id.into(),
            substitutes: substitutes.iter().map(|s| s.to_string()).collect(),
            quantity_g: 100.0,
            optional,
            weight: Some(weight),
        }
    }

    fn catalog() -> IngredientCatalog {
        IngredientCatalog::new(vec![
            ingredient("makarna", &["gluten"], &[]),
            ingredient("zeytinyagi", &[], &[]),
            ingredient("domates", &[], &[Month::June, Month::July, Month::August]),
            ingredient("salca", &[], &[]),
            ingredient("maydanoz", &[], &[]),
            ingredient("pirinc_makarna", &[], &[]),
            ingredient("taze_nane", &[], &[Month::July]),
        ])
        .unwrap()
    }

    fn sebzeli_makarna() -> Recipe {
        Recipe {
            id: "sebzeli_makarna".into(),
            name: "Sebzeli Makarna".into(),
            image_url: String::new(),
            cook_time_min: 30,
            servings: 4,
            rating: 4.7,
            requirements: vec![
                requirement("makarna", 2.0, &[], false),
                requirement("zeytinyagi", 1.0, &[], false),
                requirement("domates", 1.0, &["salca"], false),
            ],
        }
    }

    fn default_policy() -> MatchPolicy {
        MatchPolicy::default()
    }

    #[test]
    fn test_only_tomato_available() {
        let catalog = catalog();
        let result = MatchScorer::new(&catalog).score(
            &sebzeli_makarna(),
            &AvailableIngredientSet::from_manual(["domates"]),
            &default_policy(),
        );
        assert_eq!(result.match_percentage, 25);
        assert_eq!(result.missing, vec!["makarna", "zeytinyagi"]);
        assert_eq!(result.missing_mandatory, 2);
        assert_eq!(result.satisfied.len(), 1);
        assert_eq!(result.satisfied[0].satisfied_by, SatisfiedBy::Primary("domates".into()));
        assert!(!result.disqualified);
    }

    #[test]
    fn test_everything_available_scores_100() {
        let catalog = catalog();
        let result = MatchScorer::new(&catalog).score(
            &sebzeli_makarna(),
            &AvailableIngredientSet::from_manual(["domates", "makarna", "zeytinyagi"]),
            &default_policy(),
        );
        assert_eq!(result.match_percentage, 100);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_substitute_satisfies_requirement() {
        let catalog = catalog();
        let result = MatchScorer::new(&catalog).score(
            &sebzeli_makarna(),
            &AvailableIngredientSet::from_manual(["salca"]),
            &default_policy(),
        );
        assert_eq!(result.match_percentage, 25);
        assert_eq!(result.satisfied[0].requirement_id, "domates");
        assert_eq!(result.satisfied[0].satisfied_by, SatisfiedBy::Substitute("salca".into()));
        assert_eq!(result.missing, vec!["makarna", "zeytinyagi"]);
    }

    #[test]
    fn test_empty_available_scores_zero_without_disqualification() {
        let catalog = catalog();
        let result =
            MatchScorer::new(&catalog).score(&sebzeli_makarna(), &AvailableIngredientSet::new(), &default_policy());
        assert_eq!(result.match_percentage, 0);
        assert!(!result.disqualified);
        assert_eq!(result.missing, vec!["makarna", "zeytinyagi", "domates"]);
    }

    #[test]
    fn test_optional_requirements_count_half() {
        let catalog = catalog();
        let mut recipe = sebzeli_makarna();
        recipe.requirements.push(requirement("maydanoz", 2.0, &[], true));
        let scorer = MatchScorer::new(&catalog);

        // 4 mandatory weight satisfied out of 4 + 0.5 * 2
        let without_garnish = scorer.score(
            &recipe,
            &AvailableIngredientSet::from_manual(["domates", "makarna", "zeytinyagi"]),
            &default_policy(),
        );
        assert_eq!(without_garnish.match_percentage, 80);
        assert_eq!(without_garnish.missing, vec!["maydanoz"]);
        assert_eq!(without_garnish.missing_mandatory, 0);

        let with_garnish = scorer.score(
            &recipe,
            &AvailableIngredientSet::from_manual(["domates", "makarna", "zeytinyagi", "maydanoz"]),
            &default_policy(),
        );
        assert_eq!(with_garnish.match_percentage, 100);
    }

    #[test]
    fn test_half_rounds_up() {
        let catalog = catalog();
        let mut recipe = sebzeli_makarna();
        // 1 of 8 total weight -> 12.5
        recipe.requirements[0].weight = Some(6.0);
        let result = MatchScorer::new(&catalog).score(
            &recipe,
            &AvailableIngredientSet::from_manual(["zeytinyagi"]),
            &default_policy(),
        );
        assert_eq!(result.match_percentage, 13);
        assert_eq!(round_half_up(12.4999), 12);
        assert_eq!(round_half_up(99.5), 100);
    }

    #[test]
    fn test_excluded_allergen_disqualifies() {
        let catalog = catalog();
        let policy = MatchPolicy {
            excluded_allergens: ["gluten".to_string()].into_iter().collect(),
            ..default_policy()
        };
        let result = MatchScorer::new(&catalog).score(
            &sebzeli_makarna(),
            &AvailableIngredientSet::from_manual(["domates", "makarna", "zeytinyagi"]),
            &policy,
        );
        assert!(result.disqualified);
        assert_eq!(result.match_percentage, 0);
        assert_eq!(
            result.disqualification,
            Some(Disqualification::Allergen { ingredient_id: "makarna".into(), allergen: "gluten".into() })
        );
    }

    #[test]
    fn test_allergen_free_substitute_avoids_disqualification() {
        let catalog = catalog();
        let mut recipe = sebzeli_makarna();
        recipe.requirements[0].substitutes = vec!["pirinc_makarna".into()];
        let policy = MatchPolicy {
            excluded_allergens: ["gluten".to_string()].into_iter().collect(),
            ..default_policy()
        };
        let result = MatchScorer::new(&catalog).score(
            &recipe,
            &AvailableIngredientSet::from_manual(["pirinc_makarna", "zeytinyagi", "domates"]),
            &policy,
        );
        assert!(!result.disqualified);
        assert_eq!(result.match_percentage, 100);
    }

    #[test]
    fn test_missing_allergen_ingredient_does_not_disqualify() {
        let catalog = catalog();
        let policy = MatchPolicy {
            excluded_allergens: ["gluten".to_string()].into_iter().collect(),
            ..default_policy()
        };
        let result = MatchScorer::new(&catalog).score(
            &sebzeli_makarna(),
            &AvailableIngredientSet::from_manual(["domates"]),
            &policy,
        );
        assert!(!result.disqualified);
        assert_eq!(result.match_percentage, 25);
    }

    #[test]
    fn test_out_of_season_primary() {
        let catalog = catalog();
        let scorer = MatchScorer::new(&catalog);
        let winter = MatchPolicy { season: Some(Month::January), ..default_policy() };

        let no_substitute = scorer.score(&sebzeli_makarna(), &AvailableIngredientSet::from_manual(["domates"]), &winter);
        assert_eq!(
            no_substitute.disqualification,
            Some(Disqualification::OutOfSeason { ingredient_id: "domates".into(), month: Month::January })
        );

        let with_paste = scorer.score(&sebzeli_makarna(), &AvailableIngredientSet::from_manual(["salca"]), &winter);
        assert!(!with_paste.disqualified);
        assert_eq!(with_paste.match_percentage, 25);

        let summer = MatchPolicy { season: Some(Month::July), ..default_policy() };
        let in_season = scorer.score(&sebzeli_makarna(), &AvailableIngredientSet::from_manual(["domates"]), &summer);
        assert!(!in_season.disqualified);
    }

    #[test]
    fn test_quantity_shortfall_reported_without_affecting_score() {
        let catalog = catalog();
        let mut available = AvailableIngredientSet::new();
        available.insert("domates", 1.0, Some(40.0)).unwrap();
        available.insert("makarna", 1.0, Some(500.0)).unwrap();
        available.insert_manual("zeytinyagi");
        let result = MatchScorer::new(&catalog).score(&sebzeli_makarna(), &available, &default_policy());
        assert_eq!(result.match_percentage, 100);
        let tomato = result.satisfied.iter().find(|s| s.requirement_id == "domates").unwrap();
        assert_eq!(tomato.short_by_g, Some(60.0));
        let pasta = result.satisfied.iter().find(|s| s.requirement_id == "makarna").unwrap();
        assert_eq!(pasta.short_by_g, None);
    }

    #[test]
    fn test_rescoring_is_idempotent() {
        let catalog = catalog();
        let scorer = MatchScorer::new(&catalog);
        let available = AvailableIngredientSet::from_manual(["salca", "makarna"]);
        let policy = MatchPolicy { excluded_allergens: BTreeSet::new(), ..default_policy() };
        let first = scorer.score(&sebzeli_makarna(), &available, &policy);
        for _ in 0..5 {
            assert_eq!(scorer.score(&sebzeli_makarna(), &available, &policy), first);
        }
    }

    #[test]
    fn test_season_filter_prefers_in_season_substitute() {
        let catalog = catalog();
        let winter = MatchPolicy { season: Some(Month::January), ..default_policy() };
        let result = MatchScorer::new(&catalog).score(
            &sebzeli_makarna(),
            &AvailableIngredientSet::from_manual(["domates", "salca", "makarna", "zeytinyagi"]),
            &winter,
        );
        assert!(!result.disqualified);
        assert_eq!(result.match_percentage, 100);
        let tomato = result.satisfied.iter().find(|s| s.requirement_id == "domates").unwrap();
        assert_eq!(tomato.satisfied_by, SatisfiedBy::Substitute("salca".into()));

        // Without the filter the primary still wins
        let anytime = MatchScorer::new(&catalog).score(
            &sebzeli_makarna(),
            &AvailableIngredientSet::from_manual(["domates", "salca", "makarna", "zeytinyagi"]),
            &default_policy(),
        );
        let tomato = anytime.satisfied.iter().find(|s| s.requirement_id == "domates").unwrap();
        assert_eq!(tomato.satisfied_by, SatisfiedBy::Primary("domates".into()));
    }

    #[test]
    fn test_out_of_season_optional_garnish_disqualifies() {
        let catalog = catalog();
        let recipe = Recipe {
            id: "nane_makarna".into(),
            name: "Naneli Makarna".into(),
            image_url: String::new(),
            cook_time_min: 20,
            servings: 2,
            rating: 4.0,
            requirements: vec![requirement("makarna", 1.0, &[], false), requirement("taze_nane", 1.0, &[], true)],
        };
        let scorer = MatchScorer::new(&catalog);
        let available = AvailableIngredientSet::from_manual(["makarna", "taze_nane"]);

        let winter = scorer.score(&recipe, &available, &MatchPolicy { season: Some(Month::January), ..default_policy() });
        assert!(winter.disqualified);
        assert_eq!(winter.match_percentage, 0);
        assert_eq!(
            winter.disqualification,
            Some(Disqualification::OutOfSeason { ingredient_id: "taze_nane".into(), month: Month::January })
        );
        // The out-of-season garnish is not reported as used
        assert_eq!(winter.missing, vec!["taze_nane"]);

        let summer = scorer.score(&recipe, &available, &MatchPolicy { season: Some(Month::July), ..default_policy() });
        assert!(!summer.disqualified);
        assert_eq!(summer.match_percentage, 100);
    }
}
