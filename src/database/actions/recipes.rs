use std::collections::HashMap;

use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{Error, HtmlError, QueryError},
    form::NewRecipe,
    schema::{Id, Recipe, RecipeId, RecipeIngredient, RecipeIngredientRow, RecipeWithIngredients},
};

use super::ingredients::upsert_ingredient;

// Transcripts stay in the table but are never served.
const RECIPE_COLUMNS: &str = "id, title, thumbnail, link, video_id, author_id, category_id, category_confidence, user_id, created_at, updated_at";

pub async fn list_recipes(pool: &Pool<Postgres>) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> = sqlx::query_as(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn list_recipe_ingredients(
    recipe_id: RecipeId,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeIngredient>, Error> {
    let rows: Vec<RecipeIngredientRow> = sqlx::query_as(
        "
        SELECT ri.id AS id, ri.recipe_id AS recipe_id, ri.ingredient_id AS ingredient_id, i.name AS name
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY ri.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows.into_iter().map(RecipeIngredient::from).collect())
}

pub async fn get_recipe(
    recipe_id: RecipeId,
    pool: &Pool<Postgres>,
) -> Result<RecipeWithIngredients, Error> {
    let recipe: Option<Recipe> =
        sqlx::query_as(&format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"))
            .bind(recipe_id)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    let recipe = recipe.ok_or_else(|| HtmlError::NotFound.new("No recipe exists with specified id"))?;
    let ingredients = list_recipe_ingredients(recipe.id, pool).await?;

    Ok(RecipeWithIngredients {
        recipe,
        ingredients,
    })
}

/// Every recipe joined with its ingredients, newest first.
pub async fn list_recipes_with_ingredients(
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeWithIngredients>, Error> {
    let recipes = list_recipes(pool).await?;

    let parts: Vec<RecipeIngredientRow> = sqlx::query_as(
        "
        SELECT ri.id AS id, ri.recipe_id AS recipe_id, ri.ingredient_id AS ingredient_id, i.name AS name
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        ORDER BY ri.id
    ",
    )
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    let mut hashmap: HashMap<RecipeId, Vec<RecipeIngredient>> = HashMap::new();
    parts.into_iter().for_each(|x| {
        hashmap
            .entry(x.recipe_id)
            .or_default()
            .push(RecipeIngredient::from(x))
    });

    Ok(recipes
        .into_iter()
        .map(|recipe| RecipeWithIngredients {
            ingredients: hashmap.remove(&recipe.id).unwrap_or_default(),
            recipe,
        })
        .collect())
}

pub async fn recipe_exists_for_video(video_id: &str, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM recipes WHERE video_id = $1)")
        .bind(video_id)
        .fetch_one(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(exists.0)
}

async fn upsert_author(name: &str, url: Option<&str>, conn: &mut PgConnection) -> Result<Id, Error> {
    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO authors (name, url) VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET url = COALESCE(EXCLUDED.url, authors.url)
        RETURNING id
    ",
    )
    .bind(name)
    .bind(url)
    .fetch_one(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(id.0)
}

async fn find_category(name: &str, conn: &mut PgConnection) -> Result<Option<Id>, Error> {
    let id: Option<(Id,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    Ok(id.map(|id| id.0))
}

/// Stores an ingested recipe owned by `user_id`. Every write happens in one
/// transaction, so a failure part way leaves nothing behind. A recipe for a
/// video that is already stored is a conflict.
pub async fn create_recipe(
    user_id: &str,
    new_recipe: &NewRecipe,
    pool: &Pool<Postgres>,
) -> Result<RecipeWithIngredients, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let existing: Option<(RecipeId,)> = sqlx::query_as("SELECT id FROM recipes WHERE video_id = $1")
        .bind(&new_recipe.video_id)
        .fetch_optional(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    if let Some((id,)) = existing {
        log::info!("Video {} is already stored as recipe {id}", new_recipe.video_id);
        return Err(HtmlError::Conflict.new("A recipe for this video already exists"));
    }

    let author_id = upsert_author(
        &new_recipe.author_name,
        new_recipe.author_url.as_deref(),
        &mut tr,
    )
    .await?;

    let (category_id, category_confidence) = match &new_recipe.category {
        Some((name, confidence)) => match find_category(name, &mut tr).await? {
            Some(id) => (Some(id), Some(*confidence)),
            None => {
                log::warn!("Category {name} is not seeded, storing recipe without one");
                (None, None)
            }
        },
        None => (None, None),
    };

    let recipe: Recipe = sqlx::query_as(&format!(
        "
        INSERT INTO recipes (id, title, thumbnail, link, video_id, author_id, category_id, category_confidence, transcript, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {RECIPE_COLUMNS}
    "
    ))
    .bind(Uuid::new_v4())
    .bind(&new_recipe.title)
    .bind(&new_recipe.thumbnail)
    .bind(&new_recipe.link)
    .bind(&new_recipe.video_id)
    .bind(author_id)
    .bind(category_id)
    .bind(category_confidence)
    .bind(&new_recipe.transcript)
    .bind(user_id)
    .fetch_one(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    let mut ingredients = Vec::with_capacity(new_recipe.ingredient_names.len());
    for name in &new_recipe.ingredient_names {
        let ingredient_id = upsert_ingredient(name, &mut tr).await?;

        let row: Option<(Id,)> = sqlx::query_as(
            "
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2)
            ON CONFLICT (recipe_id, ingredient_id) DO NOTHING
            RETURNING id
        ",
        )
        .bind(recipe.id)
        .bind(ingredient_id)
        .fetch_optional(&mut *tr)
        .await
        .map_err(QueryError::from)?;

        if let Some((id,)) = row {
            ingredients.push(RecipeIngredient::from(RecipeIngredientRow {
                id,
                recipe_id: recipe.id,
                ingredient_id,
                name: name.to_owned(),
            }));
        }
    }

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;

    log::info!(
        "Created recipe {} for video {} with {} ingredients",
        recipe.id,
        recipe.video_id,
        ingredients.len()
    );

    Ok(RecipeWithIngredients {
        recipe,
        ingredients,
    })
}
