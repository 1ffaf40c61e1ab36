use crate::config::PantryConfig;
use crate::db::{self, models::Recipe, DbPool};
use crate::error::Result;
use crate::pantry::{Candidate, PantryMatcher, RankedMatch};
use tracing::{debug, warn};

/// Result of matching a pantry against the stored recipes
#[derive(Debug, Clone)]
pub struct PantrySearchOutcome {
    pub matches: Vec<RankedMatch<Recipe>>,
    /// Candidates that were successfully scored
    pub recipes_checked: usize,
}

/// Runs the pantry matcher over published recipes
pub struct PantrySearch<'a> {
    pool: &'a DbPool,
    config: &'a PantryConfig,
}

impl<'a> PantrySearch<'a> {
    pub fn new(pool: &'a DbPool, config: &'a PantryConfig) -> Self {
        Self { pool, config }
    }

    /// Most popular published recipes, capped at the candidate limit
    pub async fn fetch_candidates(&self) -> Result<Vec<Recipe>> {
        db::recipes::list_pantry_candidates(self.pool, self.config.candidate_limit as i64).await
    }

    /// Attach ingredient names to each recipe.
    ///
    /// A recipe whose ingredients cannot be loaded is logged and skipped.
    pub async fn enrich(&self, recipes: Vec<Recipe>) -> Vec<Candidate<Recipe>> {
        let mut candidates = Vec::with_capacity(recipes.len());

        for recipe in recipes {
            match db::ingredients::get_ingredient_names(self.pool, recipe.id).await {
                Ok(ingredients) => candidates.push(Candidate {
                    recipe,
                    ingredients,
                }),
                Err(e) => {
                    warn!(
                        "Skipping recipe {} in pantry search: {}",
                        recipe.id,
                        e.log_safe()
                    );
                }
            }
        }

        candidates
    }

    /// Fetch, enrich and rank candidates for the given pantry
    pub async fn run(&self, matcher: &PantryMatcher, limit: usize) -> Result<PantrySearchOutcome> {
        let recipes = self.fetch_candidates().await?;
        if recipes.is_empty() {
            debug!("No published recipes to match against");
            return Ok(PantrySearchOutcome {
                matches: Vec::new(),
                recipes_checked: 0,
            });
        }

        let candidates = self.enrich(recipes).await;
        let recipes_checked = candidates.len();
        let matches = matcher.rank(candidates, limit);

        debug!(
            "Pantry search checked {} recipes, {} matched",
            recipes_checked,
            matches.len()
        );

        Ok(PantrySearchOutcome {
            matches,
            recipes_checked,
        })
    }
}
