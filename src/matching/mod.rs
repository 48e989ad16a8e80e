pub mod available;
pub mod constraints;
pub mod ranking;
pub mod scorer;
pub mod substitution;

pub use available::{Availability, AvailableIngredientSet};
pub use constraints::{Constraints, MatchPolicy, Page};
pub use ranking::{RankedPage, RankedPages, RankingEngine};
pub use scorer::{Disqualification, MatchResult, MatchScorer, SatisfiedRequirement};
pub use substitution::{resolve, resolve_with, SatisfiedBy};
