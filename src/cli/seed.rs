use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

use crate::db::{models::*, recipes, DbPool};
use crate::utils::{sanitize, validation};
use crate::{Error, Result};

/// Read a JSON array of recipes
pub fn read_seed_file(path: &Path) -> anyhow::Result<Vec<RecipeDraft>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;

    let recipes = serde_json::from_str(&content)
        .with_context(|| format!("Invalid recipe JSON in {}", path.display()))?;

    Ok(recipes)
}

/// Check a seed entry and reduce its free text to plain text
fn prepare(mut seed: RecipeDraft) -> Result<RecipeDraft> {
    seed.recipe.title = sanitize::strip_markup(&seed.recipe.title);
    validation::validate_recipe_title(&seed.recipe.title)?;

    if let Some(difficulty) = &seed.recipe.difficulty {
        validation::validate_difficulty(difficulty)?;
    }

    if let Some(description) = seed.recipe.description.take() {
        validation::moderate_content(&description)?;
        seed.recipe.description = Some(sanitize::strip_markup(&description));
    }

    seed.ingredients.retain(|ing| !ing.name.trim().is_empty());

    for step in &mut seed.instructions {
        step.instruction = sanitize::strip_markup(&step.instruction);
    }
    seed.instructions.retain(|step| !step.instruction.is_empty());

    Ok(seed)
}

/// Insert one recipe with everything attached to it. Nothing is kept if
/// any part fails.
pub async fn insert_seed_recipe(pool: &DbPool, seed: RecipeDraft) -> Result<Recipe> {
    let seed = prepare(seed)?;
    recipes::create_recipe(pool, &seed).await
}

/// Load every recipe in the file, skipping entries that fail validation.
/// Returns the number inserted.
pub async fn seed_from_file(pool: &DbPool, path: &Path) -> Result<usize> {
    let entries = read_seed_file(path).map_err(|e| Error::Internal(format!("{e:#}")))?;
    info!("Seeding {} recipes from {}", entries.len(), path.display());

    let mut inserted = 0;
    for entry in entries {
        let title = entry.recipe.title.clone();
        match insert_seed_recipe(pool, entry).await {
            Ok(_) => inserted += 1,
            Err(Error::Validation(reason)) => {
                warn!("Skipping recipe '{}': {}", title, reason);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(inserted)
}
