use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<String>,
    pub status: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Thumbnail to show in listings, falling back to the full image
    pub fn thumbnail(&self) -> Option<String> {
        self.thumbnail_url.clone().or_else(|| self.image_url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "published".to_string()
}

/// Ingredient as stored for a recipe, in recipe order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub order_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// One numbered cooking step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecipeInstruction {
    pub step_number: i64,
    pub instruction: String,
    /// Minutes
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInstruction {
    pub instruction: String,
    #[serde(default)]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub category_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DietaryTag {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub tag_type: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

/// A recipe with everything that is stored alongside it.
///
/// Categories are created on demand; dietary tags must already exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(flatten)]
    pub recipe: NewRecipe,
    #[serde(default)]
    pub ingredients: Vec<NewIngredient>,
    #[serde(default)]
    pub instructions: Vec<NewInstruction>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
}

/// Optional filters for recipe search
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub max_time: Option<i64>,
    /// Canonical dietary tag name
    pub dietary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeWithDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<RecipeInstruction>,
    pub categories: Vec<Category>,
    pub dietary_tags: Vec<DietaryTag>,
}
