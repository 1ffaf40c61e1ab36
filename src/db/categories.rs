use crate::db::{models::Category, DbPool};
use crate::error::Result;
use sqlx::SqliteConnection;

/// List all categories ordered by type, then name
pub async fn list_categories(pool: &DbPool) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, type, description FROM categories ORDER BY type, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Get or create a category by exact name
async fn get_or_create_category(conn: &mut SqliteConnection, name: &str) -> Result<Category> {
    let name = name.trim();

    let existing = sqlx::query_as::<_, Category>(
        "SELECT id, name, type, description FROM categories WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(category) = existing {
        Ok(category)
    } else {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES (?) RETURNING id, name, type, description",
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(category)
    }
}

/// Link categories to a recipe, creating missing ones
pub(crate) async fn link_categories(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    names: &[String],
) -> Result<()> {
    for name in names {
        let category = get_or_create_category(conn, name).await?;
        sqlx::query("INSERT OR IGNORE INTO recipe_categories (recipe_id, category_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(category.id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Categories linked to a recipe
pub async fn get_categories_for_recipe(pool: &DbPool, recipe_id: i64) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT c.id, c.name, c.type, c.description
        FROM categories c
        JOIN recipe_categories rc ON rc.category_id = c.id
        WHERE rc.recipe_id = ?
        ORDER BY c.name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Count categories
pub async fn count_categories(pool: &DbPool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
