use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use sqlx::SqliteConnection;

/// Get ingredients for a recipe in recipe order
pub async fn get_recipe_ingredients(pool: &DbPool, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
    let ingredients = sqlx::query_as::<_, RecipeIngredient>(
        r#"
        SELECT name, quantity, unit, order_index
        FROM recipe_ingredients
        WHERE recipe_id = ?
        ORDER BY order_index, id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(ingredients)
}

/// Get ingredient names for a recipe in recipe order.
///
/// Unlike [`get_recipe_ingredients`], a recipe that no longer exists is an
/// error rather than an empty list.
pub async fn get_ingredient_names(pool: &DbPool, recipe_id: i64) -> Result<Vec<String>> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?)")
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;

    if !exists {
        return Err(Error::NotFound(format!("Recipe {recipe_id} not found")));
    }

    let names = sqlx::query_scalar(
        r#"
        SELECT name
        FROM recipe_ingredients
        WHERE recipe_id = ?
        ORDER BY order_index, id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// Insert ingredients for a new recipe. `order_index` follows slice order.
pub(crate) async fn insert_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    ingredients: &[NewIngredient],
) -> Result<()> {
    for (index, ing) in ingredients.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, name, quantity, unit, order_index)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(recipe_id)
        .bind(ing.name.trim())
        .bind(ing.quantity)
        .bind(&ing.unit)
        .bind(index as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Count total ingredient rows
pub async fn count_ingredients(pool: &DbPool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_ingredients")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
