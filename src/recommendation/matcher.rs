use std::collections::HashSet;

use crate::schema::{RecipeWithIngredients, RecipeWithMatch, UserIngredient};

pub fn normalize(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientMatch {
    pub matching: Vec<String>,
    pub missing: Vec<String>,
    pub match_rate: u8,
}

/// Splits `recipe_ingredients` into the ones found in `user_ingredients` and
/// the ones that are not, comparing case-insensitively. Both partitions keep
/// the recipe's order and spelling; repeated names are classified one by one.
pub fn match_ingredients<'a, R, U>(recipe_ingredients: R, user_ingredients: U) -> IngredientMatch
where
    R: IntoIterator<Item = &'a str>,
    U: IntoIterator<Item = &'a str>,
{
    let owned: HashSet<String> = user_ingredients.into_iter().map(normalize).collect();

    let (matching, missing): (Vec<&str>, Vec<&str>) = recipe_ingredients
        .into_iter()
        .partition(|name| owned.contains(&normalize(name)));

    let total = matching.len() + missing.len();
    let match_rate = if total == 0 {
        0
    } else {
        (100. * matching.len() as f64 / total as f64).round() as u8
    };

    IngredientMatch {
        matching: matching.into_iter().map(str::to_string).collect(),
        missing: missing.into_iter().map(str::to_string).collect(),
        match_rate,
    }
}

pub fn match_recipe(
    recipe: RecipeWithIngredients,
    user_ingredients: &[UserIngredient],
) -> RecipeWithMatch {
    let result = match_ingredients(
        recipe.ingredient_names(),
        user_ingredients.iter().map(|owned| owned.ingredient.name.as_str()),
    );

    RecipeWithMatch {
        recipe,
        matching_ingredients: result.matching,
        missing_ingredients: result.missing,
        match_rate: result.match_rate,
    }
}

pub fn match_recipes(
    recipes: Vec<RecipeWithIngredients>,
    user_ingredients: &[UserIngredient],
) -> Vec<RecipeWithMatch> {
    recipes
        .into_iter()
        .map(|recipe| match_recipe(recipe, user_ingredients))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kimchi_stew() {
        let result = match_ingredients(["Kimchi", "Pork", "Tofu"], ["kimchi", "tofu"]);

        assert_eq!(result.matching, vec!["Kimchi", "Tofu"]);
        assert_eq!(result.missing, vec!["Pork"]);
        assert_eq!(result.match_rate, 67);
    }

    #[test]
    fn matching_ignores_case() {
        let result = match_ingredients(["Onion"], ["onion"]);
        assert_eq!(result.matching, vec!["Onion"]);
        assert_eq!(result.match_rate, 100);

        let result = match_ingredients(["onion"], ["ONION"]);
        assert_eq!(result.match_rate, 100);
    }

    #[test]
    fn empty_recipe_has_zero_rate() {
        let recipe: [&str; 0] = [];
        let result = match_ingredients(recipe, ["kimchi"]);
        assert_eq!(result, IngredientMatch::default());
    }

    #[test]
    fn empty_pantry_misses_everything() {
        let pantry: [&str; 0] = [];
        let result = match_ingredients(["Egg", "Rice"], pantry);
        assert!(result.matching.is_empty());
        assert_eq!(result.missing, vec!["Egg", "Rice"]);
        assert_eq!(result.match_rate, 0);
    }

    #[test]
    fn repeated_recipe_ingredients_count_separately() {
        let result = match_ingredients(["Egg", "Rice", "egg"], ["EGG"]);
        assert_eq!(result.matching, vec!["Egg", "egg"]);
        assert_eq!(result.missing, vec!["Rice"]);
        assert_eq!(result.match_rate, 67);
    }

    #[test]
    fn partitions_cover_the_recipe() {
        let cases: [(&[&str], &[&str]); 4] = [
            (&["Kimchi", "Pork", "Tofu"], &["kimchi"]),
            (&["A", "b", "C", "a"], &["a", "c"]),
            (&["당근", "양파", "감자"], &["양파", "감자", "당근"]),
            (&["Salt"], &["pepper"]),
        ];

        for (recipe, pantry) in cases {
            let result = match_ingredients(recipe.iter().copied(), pantry.iter().copied());

            let mut combined: Vec<&str> = result
                .matching
                .iter()
                .chain(result.missing.iter())
                .map(String::as_str)
                .collect();
            let mut expected = recipe.to_vec();
            combined.sort_unstable();
            expected.sort_unstable();
            assert_eq!(combined, expected);

            assert!(result
                .matching
                .iter()
                .all(|name| !result.missing.contains(name)));
            assert!(result.match_rate <= 100);
        }
    }
}
