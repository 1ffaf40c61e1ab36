//! Pantry matching: score how well the ingredients a user has on hand cover
//! each candidate recipe, and rank the candidates.
//!
//! [`matcher`] is the pure scoring core. [`search`] loads published
//! recipes and their ingredients from the database and ranks them.

pub mod matcher;
pub mod search;

pub use matcher::{Candidate, IngredientMatch, PantryMatcher, RankedMatch, EMPTY_PANTRY_MESSAGE};
pub use search::{PantrySearch, PantrySearchOutcome};
