use std::collections::HashMap;

use serde_json::Value;
use warp::{http::StatusCode, reject::Rejection, reply, Filter, Reply};

use crate::{
    actions,
    constants::MAX_BODY_BYTES,
    form::{validate_user_ingredients, CheckExistsForm, Form, RecipeForm, UserIngredientForm},
    jwt::SessionData,
    middleware::with_session,
    recommendation::{matcher::match_recipes, ranker::rank_recipes},
    schema::{Id, RecipeExistence, RecipeId, SimpleResponse, SortKey},
    video::extract_video_id,
};

use super::context::{with_context, Context};

/// Routes mounted under `/recipes`.
pub fn recipe_routes(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    list_recipes_route(context.clone())
        .or(recipes_with_ingredients_route(context.clone()))
        .or(recommendations_route(context.clone()))
        .or(user_ingredients_route(context.clone()))
        .or(add_user_ingredients_route(context.clone()))
        .or(remove_user_ingredient_route(context.clone()))
        .or(all_ingredients_route(context.clone()))
        .or(check_exists_route(context.clone()))
        .or(create_recipe_route(context.clone()))
        .or(create_agent_recipe_route(context.clone()))
        .or(get_recipe_route(context))
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn list_recipes_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes")
        .and(warp::get())
        .and(with_session(context.keys.clone()))
        .and(with_context(context))
        .and_then(handle_list_recipes)
}

fn get_recipe_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / RecipeId)
        .and(warp::get())
        .and(with_session(context.keys.clone()))
        .and(with_context(context))
        .and_then(handle_get_recipe)
}

fn recipes_with_ingredients_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "recipes-with-ingredients")
        .and(warp::get())
        .and(with_session(context.keys.clone()))
        .and(with_context(context))
        .and_then(handle_recipes_with_ingredients)
}

fn recommendations_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "recommendations")
        .and(warp::get())
        .and(with_session(context.keys.clone()))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_context(context))
        .and_then(handle_recommendations)
}

fn user_ingredients_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "ingredients")
        .and(warp::get())
        .and(with_session(context.keys.clone()))
        .and(with_context(context))
        .and_then(handle_user_ingredients)
}

fn add_user_ingredients_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "ingredients")
        .and(warp::post())
        .and(with_session(context.keys.clone()))
        .and(json_body::<Vec<UserIngredientForm>>())
        .and(with_context(context))
        .and_then(handle_add_user_ingredients)
}

fn remove_user_ingredient_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "ingredients" / Id)
        .and(warp::delete())
        .and(with_session(context.keys.clone()))
        .and(with_context(context))
        .and_then(handle_remove_user_ingredient)
}

fn all_ingredients_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "all-ingredients")
        .and(warp::get())
        .and(with_session(context.keys.clone()))
        .and(with_context(context))
        .and_then(handle_all_ingredients)
}

fn check_exists_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "check-exists")
        .and(warp::post())
        .and(json_body::<CheckExistsForm>())
        .and(with_context(context))
        .and_then(handle_check_exists)
}

fn create_recipe_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes")
        .and(warp::post())
        .and(with_session(context.keys.clone()))
        .and(json_body::<RecipeForm>())
        .and(with_context(context))
        .and_then(handle_create_recipe)
}

fn create_agent_recipe_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("recipes" / "from-agent")
        .and(warp::post())
        .and(json_body::<RecipeForm>())
        .and(with_context(context))
        .and_then(handle_create_agent_recipe)
}

async fn handle_list_recipes(_: SessionData, context: Context) -> Result<impl Reply, Rejection> {
    let recipes = actions::list_recipes(&context.pool).await?;
    Ok(reply::json(&recipes))
}

async fn handle_get_recipe(
    recipe_id: RecipeId,
    _: SessionData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let recipe = actions::get_recipe(recipe_id, &context.pool).await?;
    Ok(reply::json(&recipe))
}

async fn handle_recipes_with_ingredients(
    _: SessionData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let recipes = actions::list_recipes_with_ingredients(&context.pool).await?;
    Ok(reply::json(&recipes))
}

async fn handle_recommendations(
    session: SessionData,
    query: HashMap<String, String>,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let form = Form::from_data(
        query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    );
    let sort = form.get_optional_value::<SortKey>("sort")?.unwrap_or_default();

    let (recipes, owned) = tokio::try_join!(
        actions::list_recipes_with_ingredients(&context.pool),
        actions::list_user_ingredients(&session.sub, &context.pool),
    )?;

    let ranked = rank_recipes(match_recipes(recipes, &owned), sort);
    Ok(reply::json(&ranked))
}

async fn handle_user_ingredients(
    session: SessionData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let ingredients = actions::list_user_ingredients(&session.sub, &context.pool).await?;
    Ok(reply::json(&ingredients))
}

async fn handle_add_user_ingredients(
    session: SessionData,
    forms: Vec<UserIngredientForm>,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let ingredients = validate_user_ingredients(&forms)?;
    actions::add_user_ingredients(&session.sub, &ingredients, &context.pool).await?;

    Ok(reply::with_status(
        reply::json(&SimpleResponse::ok("Ingredients added")),
        StatusCode::CREATED,
    ))
}

async fn handle_remove_user_ingredient(
    user_ingredient_id: Id,
    session: SessionData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    actions::remove_user_ingredient(&session.sub, user_ingredient_id, &context.pool).await?;
    Ok(reply::json(&SimpleResponse::ok("Ingredient removed")))
}

async fn handle_all_ingredients(_: SessionData, context: Context) -> Result<impl Reply, Rejection> {
    let ingredients = actions::list_ingredients(&context.pool).await?;
    Ok(reply::json(&ingredients))
}

async fn handle_check_exists(
    form: CheckExistsForm,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let existence = match extract_video_id(&form.youtube_url) {
        Some(video_id) => RecipeExistence {
            exists: actions::recipe_exists_for_video(&video_id, &context.pool).await?,
            video_id: Some(video_id),
        },
        None => RecipeExistence {
            exists: false,
            video_id: None,
        },
    };
    Ok(reply::json(&existence))
}

async fn create_recipe_for(
    context: &Context,
    user_id: &str,
    form: RecipeForm,
) -> Result<reply::WithStatus<reply::Json>, Rejection> {
    let new_recipe = form.validate()?;
    let recipe = actions::create_recipe(user_id, &new_recipe, &context.pool).await?;

    Ok(reply::with_status(reply::json(&recipe), StatusCode::CREATED))
}

async fn handle_create_recipe(
    session: SessionData,
    form: RecipeForm,
    context: Context,
) -> Result<impl Reply, Rejection> {
    create_recipe_for(&context, &session.sub, form).await
}

async fn handle_create_agent_recipe(
    form: RecipeForm,
    context: Context,
) -> Result<impl Reply, Rejection> {
    create_recipe_for(&context, &context.config.agent_user_id, form).await
}
