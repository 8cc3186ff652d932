use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TypeError;

pub type Id = i32;
pub type RecipeId = uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
}

/// Flat join of `user_ingredients` and `ingredients`.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserIngredientRow {
    pub id: Id,
    pub ingredient_id: Id,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIngredient {
    pub id: Id,
    pub ingredient_id: Id,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub ingredient: Ingredient,
}

impl From<UserIngredientRow> for UserIngredient {
    fn from(row: UserIngredientRow) -> Self {
        Self {
            id: row.id,
            ingredient_id: row.ingredient_id,
            quantity: row.quantity,
            unit: row.unit,
            ingredient: Ingredient {
                id: row.ingredient_id,
                name: row.name,
            },
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub thumbnail: Option<String>,
    pub link: String,
    pub video_id: String,
    pub author_id: Id,
    pub category_id: Option<Id>,
    pub category_confidence: Option<f64>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat join of `recipe_ingredients` and `ingredients`.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RecipeIngredientRow {
    pub id: Id,
    pub recipe_id: RecipeId,
    pub ingredient_id: Id,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub id: Id,
    pub recipe_id: RecipeId,
    pub ingredient_id: Id,
    pub ingredient: Ingredient,
}

impl From<RecipeIngredientRow> for RecipeIngredient {
    fn from(row: RecipeIngredientRow) -> Self {
        Self {
            id: row.id,
            recipe_id: row.recipe_id,
            ingredient_id: row.ingredient_id,
            ingredient: Ingredient {
                id: row.ingredient_id,
                name: row.name,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
}

impl RecipeWithIngredients {
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|part| part.ingredient.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeWithMatch {
    #[serde(flatten)]
    pub recipe: RecipeWithIngredients,
    pub matching_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub match_rate: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Match,
    Title,
}

impl FromStr for SortKey {
    type Err = TypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "match" => Ok(Self::Match),
            "title" => Ok(Self::Title),
            _ => Err(TypeError::new("Invalid sort key")),
        }
    }
}

impl TryFrom<Value> for SortKey {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => value.parse(),
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeExistence {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub message: String,
}

impl SimpleResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}
