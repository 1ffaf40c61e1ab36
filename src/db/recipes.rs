use crate::db::{categories, dietary_tags, ingredients, instructions, models::*, DbPool};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

/// Insert the recipe row; search text covers title and description only
/// until [`refresh_search_text`] runs.
async fn insert_recipe(conn: &mut SqliteConnection, new_recipe: &NewRecipe) -> Result<Recipe> {
    let now = Utc::now();

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (
            title, description, image_url, thumbnail_url,
            prep_time, cook_time, total_time, servings,
            difficulty, status, search_text, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new_recipe.title)
    .bind(&new_recipe.description)
    .bind(&new_recipe.image_url)
    .bind(&new_recipe.thumbnail_url)
    .bind(new_recipe.prep_time)
    .bind(new_recipe.cook_time)
    .bind(new_recipe.total_time)
    .bind(new_recipe.servings)
    .bind(&new_recipe.difficulty)
    .bind(&new_recipe.status)
    .bind(build_search_text(
        &new_recipe.title,
        new_recipe.description.as_deref(),
        &[],
    ))
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(recipe)
}

/// Create a recipe with its ingredients, steps, categories and dietary tags.
///
/// Everything is written in one transaction; any failure leaves no trace.
pub async fn create_recipe(pool: &DbPool, draft: &RecipeDraft) -> Result<Recipe> {
    let mut tx = pool.begin().await?;

    let recipe = insert_recipe(&mut tx, &draft.recipe).await?;
    ingredients::insert_ingredients(&mut tx, recipe.id, &draft.ingredients).await?;
    instructions::insert_instructions(&mut tx, recipe.id, &draft.instructions).await?;
    categories::link_categories(&mut tx, recipe.id, &draft.categories).await?;
    dietary_tags::link_dietary_tags(&mut tx, recipe.id, &draft.dietary_tags).await?;
    refresh_search_text(&mut tx, recipe.id).await?;

    tx.commit().await?;
    Ok(recipe)
}

/// Get recipe by ID
pub async fn get_recipe(pool: &DbPool, recipe_id: i64) -> Result<Recipe> {
    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    Ok(recipe)
}

/// Get recipe with ordered ingredients and steps, categories and dietary tags
pub async fn get_recipe_with_details(pool: &DbPool, recipe_id: i64) -> Result<RecipeWithDetails> {
    let recipe = get_recipe(pool, recipe_id).await?;
    let ingredients = ingredients::get_recipe_ingredients(pool, recipe_id).await?;
    let instructions = instructions::get_recipe_instructions(pool, recipe_id).await?;
    let categories = categories::get_categories_for_recipe(pool, recipe_id).await?;
    let dietary_tags = dietary_tags::get_dietary_tags_for_recipe(pool, recipe_id).await?;

    Ok(RecipeWithDetails {
        recipe,
        ingredients,
        instructions,
        categories,
        dietary_tags,
    })
}

/// Bump the view counter
pub async fn increment_views(pool: &DbPool, recipe_id: i64) -> Result<()> {
    sqlx::query("UPDATE recipes SET views = views + 1 WHERE id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Search published recipes, newest first
pub async fn search_recipes(
    pool: &DbPool,
    filter: &RecipeFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Recipe>> {
    let q = filter
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT r.*
        FROM recipes r
        WHERE r.status = 'published'
          AND (?1 IS NULL OR instr(r.search_text, ?1) > 0)
          AND (?2 IS NULL OR EXISTS (
                SELECT 1 FROM recipe_categories rc
                JOIN categories c ON rc.category_id = c.id
                WHERE rc.recipe_id = r.id AND c.name = ?2
          ))
          AND (?3 IS NULL OR r.difficulty = ?3)
          AND (?4 IS NULL OR r.total_time <= ?4)
          AND (?5 IS NULL OR EXISTS (
                SELECT 1 FROM recipe_dietary_tags rdt
                JOIN dietary_tags dt ON rdt.tag_id = dt.id
                WHERE rdt.recipe_id = r.id AND dt.name = ?5
          ))
        ORDER BY r.created_at DESC, r.id DESC
        LIMIT ?6 OFFSET ?7
        "#,
    )
    .bind(q)
    .bind(&filter.category)
    .bind(&filter.difficulty)
    .bind(filter.max_time)
    .bind(&filter.dietary)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// Most viewed published recipes, most recent first on ties
pub async fn list_trending(pool: &DbPool, limit: i64) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT * FROM recipes
        WHERE status = 'published'
        ORDER BY views DESC, created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// Newest published recipes
pub async fn list_recent(pool: &DbPool, limit: i64) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT * FROM recipes
        WHERE status = 'published'
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// Published recipes ordered by popularity, used as pantry match candidates
pub async fn list_pantry_candidates(pool: &DbPool, limit: i64) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT * FROM recipes
        WHERE status = 'published'
        ORDER BY views DESC, id ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// Count published recipes
pub async fn count_published_recipes(pool: &DbPool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE status = 'published'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Count recipes created at or after `since`
pub async fn count_recipes_created_since(pool: &DbPool, since: DateTime<Utc>) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE created_at >= ?")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Lowercased text searched by the `q` filter
pub fn build_search_text(title: &str, description: Option<&str>, ingredient_names: &[String]) -> String {
    let mut parts = vec![title.to_lowercase()];
    if let Some(description) = description {
        parts.push(description.to_lowercase());
    }
    parts.extend(ingredient_names.iter().map(|name| name.to_lowercase()));
    parts.join("\n")
}

/// Recompute the search text from the stored title, description and
/// ingredient names
pub(crate) async fn refresh_search_text(conn: &mut SqliteConnection, recipe_id: i64) -> Result<()> {
    let (title, description): (String, Option<String>) =
        sqlx::query_as("SELECT title, description FROM recipes WHERE id = ?")
            .bind(recipe_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM recipe_ingredients WHERE recipe_id = ? ORDER BY order_index, id",
    )
    .bind(recipe_id)
    .fetch_all(&mut *conn)
    .await?;

    sqlx::query("UPDATE recipes SET search_text = ? WHERE id = ?")
        .bind(build_search_text(&title, description.as_deref(), &names))
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_recipe(title: &str, ingredient_names: &[&str]) -> RecipeDraft {
    RecipeDraft {
        recipe: NewRecipe {
            title: title.to_string(),
            description: None,
            image_url: None,
            thumbnail_url: None,
            prep_time: None,
            cook_time: None,
            total_time: None,
            servings: Some(4),
            difficulty: None,
            status: "published".to_string(),
        },
        ingredients: ingredient_names
            .iter()
            .map(|name| NewIngredient {
                name: name.to_string(),
                quantity: Some(100.0),
                unit: Some("g".to_string()),
            })
            .collect(),
        instructions: Vec::new(),
        categories: Vec::new(),
        dietary_tags: Vec::new(),
    }
}

#[cfg(test)]
pub(crate) async fn delete_recipe(pool: &DbPool, recipe_id: i64) {
    sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await
        .unwrap();
}
