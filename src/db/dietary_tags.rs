use crate::db::{models::DietaryTag, DbPool};
use crate::error::{Error, Result};
use sqlx::SqliteConnection;

/// Filter slugs accepted in place of the stored tag names
const TAG_SLUGS: &[(&str, &str)] = &[
    ("vegetarian", "Vegetarian"),
    ("vegan", "Vegan"),
    ("gluten-free", "Gluten-Free"),
    ("dairy-free", "Dairy-Free"),
    ("nut-free", "Nut-Free"),
    ("egg-free", "Egg-Free"),
    ("soy-free", "Soy-Free"),
    ("seafood-free", "Seafood-Free"),
    ("low-carb", "Low-Carb"),
    ("keto", "Keto"),
    ("paleo", "Paleo"),
    ("halal", "Halal"),
    ("kosher", "Kosher"),
];

/// Stored tag name for a filter value: known slugs map case-insensitively,
/// anything else is used as given
pub fn canonical_tag_name(value: &str) -> String {
    let value = value.trim();
    let slug = value.to_lowercase();

    TAG_SLUGS
        .iter()
        .find(|(known, _)| *known == slug)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| value.to_string())
}

/// All dietary tags ordered by type, then name
pub async fn list_dietary_tags(pool: &DbPool) -> Result<Vec<DietaryTag>> {
    let tags = sqlx::query_as::<_, DietaryTag>(
        "SELECT id, name, type, icon, description FROM dietary_tags ORDER BY type, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Tags linked to a recipe
pub async fn get_dietary_tags_for_recipe(pool: &DbPool, recipe_id: i64) -> Result<Vec<DietaryTag>> {
    let tags = sqlx::query_as::<_, DietaryTag>(
        r#"
        SELECT dt.id, dt.name, dt.type, dt.icon, dt.description
        FROM dietary_tags dt
        JOIN recipe_dietary_tags rdt ON rdt.tag_id = dt.id
        WHERE rdt.recipe_id = ?
        ORDER BY dt.type, dt.name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Link existing tags to a recipe. An unknown tag is a validation error.
pub(crate) async fn link_dietary_tags(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    names: &[String],
) -> Result<()> {
    for name in names {
        let name = canonical_tag_name(name);
        let tag_id: i64 = sqlx::query_scalar("SELECT id FROM dietary_tags WHERE name = ?")
            .bind(&name)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| Error::Validation(format!("Unknown dietary tag: {name}")))?;

        sqlx::query("INSERT OR IGNORE INTO recipe_dietary_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::recipes::{create_recipe, sample_recipe};
    use crate::db::test_pool;

    #[test]
    fn test_canonical_tag_name() {
        assert_eq!(canonical_tag_name("gluten-free"), "Gluten-Free");
        assert_eq!(canonical_tag_name(" VEGAN "), "Vegan");
        assert_eq!(canonical_tag_name("Clean Eating"), "Clean Eating");
    }

    #[tokio::test]
    async fn test_builtin_tags_are_listed() {
        let pool = test_pool().await;

        let tags = list_dietary_tags(&pool).await.unwrap();
        assert_eq!(tags.len(), TAG_SLUGS.len());
        // ordered by type first
        assert_eq!(tags[0].tag_type, "allergy");
        assert!(tags.iter().any(|t| t.name == "Vegetarian" && t.tag_type == "diet"));
    }

    #[tokio::test]
    async fn test_recipe_tags_accept_slugs() {
        let pool = test_pool().await;

        let mut draft = sample_recipe("Đậu hũ sốt cà", &["Đậu hũ", "Cà chua"]);
        draft.dietary_tags = vec!["vegan".to_string(), "Vegan".to_string(), "nut-free".to_string()];
        let recipe = create_recipe(&pool, &draft).await.unwrap();

        let names: Vec<String> = get_dietary_tags_for_recipe(&pool, recipe.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Nut-Free", "Vegan"]);
    }
}
