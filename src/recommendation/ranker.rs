use std::cmp::Ordering;

use crate::schema::{RecipeWithMatch, SortKey};

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// `(owned, total)` of a recipe's ingredients. Recipes without ingredients
/// count as `0 / 1`.
fn exact_rate(recipe: &RecipeWithMatch) -> (usize, usize) {
    let owned = recipe.matching_ingredients.len();
    (owned, (owned + recipe.missing_ingredients.len()).max(1))
}

// Cross-multiplied so rates that round to the same percentage still order.
fn compare_rates(a: &RecipeWithMatch, b: &RecipeWithMatch) -> Ordering {
    let (a_owned, a_total) = exact_rate(a);
    let (b_owned, b_total) = exact_rate(b);
    (a_owned * b_total).cmp(&(b_owned * a_total))
}

/// Stable sort; recipes that compare equal keep their input order.
pub fn rank_recipes(mut recipes: Vec<RecipeWithMatch>, key: SortKey) -> Vec<RecipeWithMatch> {
    match key {
        SortKey::Match => recipes.sort_by(|a, b| compare_rates(b, a)),
        SortKey::Title => recipes.sort_by(|a, b| {
            compare_titles(&a.recipe.recipe.title, &b.recipe.recipe.title)
        }),
    }
    recipes
}
