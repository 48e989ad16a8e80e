use serde::Serialize;

use super::available::AvailableIngredientSet;
use crate::catalog::recipe::Requirement;

/// Which ingredient filled a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", content = "ingredient_id", rename_all = "snake_case")]
pub enum SatisfiedBy {
    Primary(String),
    Substitute(String),
}

impl SatisfiedBy {
    pub fn ingredient_id(&self) -> &str {
        match self {
            SatisfiedBy::Primary(id) | SatisfiedBy::Substitute(id) => id,
        }
    }

    pub fn is_substitute(&self) -> bool {
        matches!(self, SatisfiedBy::Substitute(_))
    }
}

/// Primary ingredient first, then substitutes in the order the recipe declares
/// them. Confidence only gates acceptance; it never reorders candidates.
pub fn resolve(requirement: &Requirement, available: &AvailableIngredientSet, threshold: f64) -> Option<SatisfiedBy> {
    resolve_with(requirement, available, threshold, |_| true)
}

/// Like [`resolve`], but candidates rejected by `usable` are skipped even when on hand.
pub fn resolve_with(
    requirement: &Requirement,
    available: &AvailableIngredientSet,
    threshold: f64,
    usable: impl Fn(&str) -> bool,
) -> Option<SatisfiedBy> {
    let accepted = |id: &str| usable(id) && available.accepts(id, threshold);
    if accepted(requirement.ingredient_id.as_str()) {
        return Some(SatisfiedBy::Primary(requirement.ingredient_id.clone()));
    }
    requirement
        .substitutes
        .iter()
        .find(|id| accepted(id.as_str()))
        .map(|id| SatisfiedBy::Substitute(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tomato_requirement() -> Requirement {
        Requirement {
            id: "domates".into(),
            ingredient_id: "domates".into(),
            substitutes: vec!["salca".into(), "konserve_domates".into()],
            quantity_g: 200.0,
            optional: false,
            weight: None,
        }
    }

    #[test]
    fn test_primary_wins_over_substitutes() {
        let available = AvailableIngredientSet::from_manual(["domates", "salca"]);
        assert_eq!(
            resolve(&tomato_requirement(), &available, 0.5),
            Some(SatisfiedBy::Primary("domates".into()))
        );
    }

    #[test]
    fn test_declared_order_not_confidence() {
        let mut available = AvailableIngredientSet::new();
        available.insert("salca", 0.6, None).unwrap();
        available.insert("konserve_domates", 1.0, None).unwrap();
        let resolved = resolve(&tomato_requirement(), &available, 0.5).unwrap();
        assert_eq!(resolved, SatisfiedBy::Substitute("salca".into()));
        assert!(resolved.is_substitute());
    }

    #[test]
    fn test_low_confidence_skipped() {
        let mut available = AvailableIngredientSet::new();
        available.insert("domates", 0.3, None).unwrap();
        available.insert("salca", 0.2, None).unwrap();
        available.insert("konserve_domates", 0.7, None).unwrap();
        assert_eq!(
            resolve(&tomato_requirement(), &available, 0.5).map(|s| s.ingredient_id().to_string()),
            Some("konserve_domates".to_string())
        );
    }

    #[test]
    fn test_unsatisfied() {
        let mut requirement = tomato_requirement();
        requirement.substitutes.clear();
        let available = AvailableIngredientSet::from_manual(["salca"]);
        assert_eq!(resolve(&requirement, &available, 0.5), None);
        assert_eq!(resolve(&requirement, &AvailableIngredientSet::new(), 0.0), None);
    }

    #[test]
    fn test_unusable_primary_falls_through_to_substitute() {
        let available = AvailableIngredientSet::from_manual(["domates", "salca"]);
        assert_eq!(
            resolve_with(&tomato_requirement(), &available, 0.5, |id| id != "domates"),
            Some(SatisfiedBy::Substitute("salca".into()))
        );
        assert_eq!(resolve_with(&tomato_requirement(), &available, 0.5, |_| false), None);
    }
}
