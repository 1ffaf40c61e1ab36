use crate::db::{models::*, DbPool};
use crate::error::Result;
use sqlx::SqliteConnection;

/// Cooking steps for a recipe, by step number
pub async fn get_recipe_instructions(
    pool: &DbPool,
    recipe_id: i64,
) -> Result<Vec<RecipeInstruction>> {
    let steps = sqlx::query_as::<_, RecipeInstruction>(
        r#"
        SELECT step_number, instruction, duration
        FROM recipe_instructions
        WHERE recipe_id = ?
        ORDER BY step_number
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(steps)
}

/// Insert steps for a new recipe, numbered from 1 in slice order
pub(crate) async fn insert_instructions(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    steps: &[NewInstruction],
) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO recipe_instructions (recipe_id, step_number, instruction, duration)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(recipe_id)
        .bind(index as i64 + 1)
        .bind(step.instruction.trim())
        .bind(step.duration)
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

    #[tokio::test]
    async fn test_steps_are_numbered_in_order() {
        let pool = test_pool().await;

        let mut draft = sample_recipe("Bún chả", &["Bún", "Thịt heo"]);
        draft.instructions = ["Ướp thịt", "Nướng chả", "Pha nước mắm"]
            .iter()
            .map(|text| NewInstruction {
                instruction: text.to_string(),
                duration: Some(10),
            })
            .collect();
        let recipe = create_recipe(&pool, &draft).await.unwrap();

        let steps = get_recipe_instructions(&pool, recipe.id).await.unwrap();
        let numbers: Vec<i64> = steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(steps[1].instruction, "Nướng chả");
        assert_eq!(steps[2].duration, Some(10));
    }
}
