use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{Error, HtmlError, QueryError},
    form::NewUserIngredient,
    schema::{Id, Ingredient, UserIngredient, UserIngredientRow},
};

pub async fn list_ingredients(pool: &Pool<Postgres>) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = sqlx::query_as("SELECT id, name FROM ingredients ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(rows)
}

/// Returns the id of the ingredient called `name`, inserting it if needed.
pub async fn upsert_ingredient(name: &str, conn: &mut PgConnection) -> Result<Id, Error> {
    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO ingredients (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
    ",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(id.0)
}

pub async fn list_user_ingredients(
    user_id: &str,
    pool: &Pool<Postgres>,
) -> Result<Vec<UserIngredient>, Error> {
    let rows: Vec<UserIngredientRow> = sqlx::query_as(
        "
        SELECT ui.id AS id, ui.ingredient_id AS ingredient_id, ui.quantity AS quantity, ui.unit AS unit, i.name AS name
        FROM user_ingredients ui
        INNER JOIN ingredients i ON i.id = ui.ingredient_id
        WHERE ui.user_id = $1
        ORDER BY ui.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows.into_iter().map(UserIngredient::from).collect())
}

/// Adds every ingredient in `ingredients` to the user's pantry in one
/// transaction. Known names reuse their ingredient row; an ingredient the
/// user already holds only has its quantity and unit replaced.
pub async fn add_user_ingredients(
    user_id: &str,
    ingredients: &[NewUserIngredient],
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    for ingredient in ingredients {
        let ingredient_id = upsert_ingredient(&ingredient.name, &mut tr).await?;

        sqlx::query(
            "
            INSERT INTO user_ingredients (user_id, ingredient_id, quantity, unit)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, ingredient_id) DO UPDATE
            SET quantity = EXCLUDED.quantity, unit = EXCLUDED.unit
        ",
        )
        .bind(user_id)
        .bind(ingredient_id)
        .bind(ingredient.quantity)
        .bind(&ingredient.unit)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;
    }

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;

    log::info!("Added {} ingredients for user {user_id}", ingredients.len());
    Ok(())
}

pub async fn remove_user_ingredient(
    user_id: &str,
    user_ingredient_id: Id,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM user_ingredients WHERE id = $1 AND user_id = $2")
        .bind(user_ingredient_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(HtmlError::NotFound.new("No ingredient exists with specified id"));
    }

    Ok(())
}
