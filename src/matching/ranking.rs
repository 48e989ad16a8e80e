use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use super::available::AvailableIngredientSet;
use super::constraints::{Constraints, MatchPolicy, Page};
use super::scorer::{MatchResult, MatchScorer};
use crate::catalog::loader::Catalogs;
use crate::catalog::recipe::{Recipe, RecipeCatalog};
use crate::catalog::ingredient::IngredientCatalog;
use crate::error::ConstraintError;

/// One window of the ranked list plus the number of qualifying recipes overall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPage {
    pub results: Vec<MatchResult>,
    pub total: usize,
    pub page: Page,
}

/// Scores the whole recipe catalog and orders the survivors.
#[derive(Debug, Clone, Copy)]
pub struct RankingEngine<'a> {
    ingredients: &'a IngredientCatalog,
    recipes: &'a RecipeCatalog,
}

impl<'a> RankingEngine<'a> {
    pub fn new(catalogs: &'a Catalogs) -> Self {
        Self::from_parts(&catalogs.ingredients, &catalogs.recipes)
    }

    pub fn from_parts(ingredients: &'a IngredientCatalog, recipes: &'a RecipeCatalog) -> Self {
        Self { ingredients, recipes }
    }

    /// Validates `constraints`, then returns the requested page.
    pub fn rank(
        &self,
        available: &AvailableIngredientSet,
        constraints: &Constraints,
    ) -> Result<RankedPage, ConstraintError> {
        let (policy, page) = constraints.validate()?;
        let ranked = self.rank_all(available, &policy);
        let total = ranked.len();
        let results = ranked.into_iter().skip(page.offset).take(page.size).collect();
        Ok(RankedPage { results, total, page })
    }

    /// Lazy page sequence starting at the page in `constraints`. Nothing is
    /// scored until the first page is pulled.
    pub fn pages<'s>(
        &self,
        available: &'s AvailableIngredientSet,
        constraints: &Constraints,
    ) -> Result<RankedPages<'s>, ConstraintError>
    where
        'a: 's,
    {
        let (policy, page) = constraints.validate()?;
        Ok(RankedPages {
            engine: *self,
            available,
            policy,
            first: page,
            next: page,
            ranked: None,
        })
    }

    /// Every non-disqualified result, best first.
    pub fn rank_all(&self, available: &AvailableIngredientSet, policy: &MatchPolicy) -> Vec<MatchResult> {
        let scorer = MatchScorer::new(self.ingredients);
        let recipes = self.recipes.recipes();

        let mut scored: Vec<(&Recipe, MatchResult)> = recipes
            .par_iter()
            .map(|recipe| (recipe, scorer.score(recipe, available, policy)))
            .filter(|(_, result)| !result.disqualified)
            .collect();
        scored.par_sort_by(|(ra, a), (rb, b)| compare(ra, a, rb, b));

        debug!(
            "Ranked {} recipes against {} available ingredients: {} qualifying, {} disqualified",
            recipes.len(),
            available.len(),
            scored.len(),
            recipes.len() - scored.len()
        );
        scored.into_iter().map(|(_, result)| result).collect()
    }
}

/// Higher match, then higher rating, then fewer missing mandatory
/// requirements, then shorter cook time, then recipe id.
fn compare(ra: &Recipe, a: &MatchResult, rb: &Recipe, b: &MatchResult) -> Ordering {
    b.match_percentage
        .cmp(&a.match_percentage)
        .then_with(|| rb.rating.total_cmp(&ra.rating))
        .then_with(|| a.missing_mandatory.cmp(&b.missing_mandatory))
        .then_with(|| ra.cook_time_min.cmp(&rb.cook_time_min))
        .then_with(|| ra.id.cmp(&rb.id))
}

/// Restartable iterator over consecutive pages. The full ranking is computed
/// once, on the first pull, and reused afterwards.
#[derive(Debug)]
pub struct RankedPages<'s> {
    engine: RankingEngine<'s>,
    available: &'s AvailableIngredientSet,
    policy: MatchPolicy,
    first: Page,
    next: Page,
    ranked: Option<Vec<MatchResult>>,
}

impl RankedPages<'_> {
    /// Rewinds to the page the sequence started at.
    pub fn restart(&mut self) {
        self.next = self.first;
    }

    pub fn total(&mut self) -> usize {
        self.ranked().len()
    }

    fn ranked(&mut self) -> &[MatchResult] {
        let (engine, available, policy) = (self.engine, self.available, &self.policy);
        self.ranked.get_or_insert_with(|| engine.rank_all(available, policy))
    }
}

impl Iterator for RankedPages<'_> {
    type Item = RankedPage;

    fn next(&mut self) -> Option<RankedPage> {
        let page = self.next;
        let ranked = self.ranked();
        if page.offset >= ranked.len() {
            return None;
        }
        let results = ranked.iter().skip(page.offset).take(page.size).cloned().collect();
        let total = ranked.len();
        self.next = page.next();
        Some(RankedPage { results, total, page })
    }
}
