use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::constants::{CUISINE_CATEGORIES, UNKNOWN_AUTHOR, UNTITLED_RECIPE};

use super::{error::TypeError, video::extract_video_id};

pub type FormData = HashMap<String, Value>;

const MAX_NAME_LENGTH: usize = 100;

/// Loosely typed key/value input, used for query strings.
pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    pub fn get_optional_value<T>(&self, key: &str) -> Result<Option<T>, TypeError>
    where
        T: TryFrom<Value, Error = TypeError>,
    {
        match self.inner.get(key) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => value.to_owned().try_into().map(Some),
        }
    }
}

fn clean_name(name: &str) -> Result<String, TypeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TypeError::new("Ingredient name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(TypeError::new("Ingredient name is too long"));
    }
    Ok(name.to_string())
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_web_url(value: &str) -> Result<Url, TypeError> {
    let url = Url::parse(value.trim()).map_err(|_| TypeError::new("Invalid URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(TypeError::new("Invalid URL; Expected http or https")),
    }
}

// User ingredients

#[derive(Debug, Clone, Deserialize)]
pub struct UserIngredientForm {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUserIngredient {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl UserIngredientForm {
    pub fn validate(&self) -> Result<NewUserIngredient, TypeError> {
        let name = clean_name(&self.name)?;

        if let Some(quantity) = self.quantity {
            if !quantity.is_finite() || quantity < 0. {
                return Err(TypeError::new("Quantity must be a non-negative number"));
            }
        }

        Ok(NewUserIngredient {
            name,
            quantity: self.quantity,
            unit: clean_optional(self.unit.as_deref()),
        })
    }
}

pub fn validate_user_ingredients(
    forms: &[UserIngredientForm],
) -> Result<Vec<NewUserIngredient>, TypeError> {
    if forms.is_empty() {
        return Err(TypeError::new("At least one ingredient is required"));
    }
    forms.iter().map(UserIngredientForm::validate).collect()
}

// Recipe lookup

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckExistsForm {
    pub youtube_url: String,
}

// Recipe ingestion

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientForm {
    pub name: String,
    pub original_name: Option<String>,
    pub normalized_name: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CuisineInfoForm {
    pub cuisine_type: String,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataForm {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeForm {
    pub youtube_url: String,
    pub title: Option<String>,
    pub metadata: Option<MetadataForm>,
    pub ingredients: Vec<IngredientForm>,
    pub cuisine_info: Option<CuisineInfoForm>,
    pub transcript: Option<String>,
    pub processing_status: String,
}

/// Ingestion data after validation, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub link: String,
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub author_name: String,
    pub author_url: Option<String>,
    pub category: Option<(String, f64)>,
    pub ingredient_names: Vec<String>,
    pub transcript: Option<String>,
}

impl IngredientForm {
    fn stored_name(&self) -> Result<String, TypeError> {
        if !self.confidence.is_finite() {
            return Err(TypeError::new("Ingredient confidence must be a number"));
        }
        match clean_optional(self.normalized_name.as_deref()) {
            Some(normalized) => clean_name(&normalized),
            None => clean_name(&self.name),
        }
    }
}

impl CuisineInfoForm {
    fn category(&self) -> Result<(String, f64), TypeError> {
        if !self.confidence.is_finite() {
            return Err(TypeError::new("Cuisine confidence must be a number"));
        }

        let cuisine = self.cuisine_type.trim();
        let name = CUISINE_CATEGORIES
            .iter()
            .find(|(korean, english)| *korean == cuisine || english.eq_ignore_ascii_case(cuisine))
            .map(|(korean, _)| *korean);

        match name {
            Some(name) => Ok((name.to_string(), self.confidence)),
            None => {
                log::warn!("Unknown cuisine type '{cuisine}', filing under 기타");
                Ok((String::from("기타"), self.confidence))
            }
        }
    }
}

impl RecipeForm {
    pub fn validate(&self) -> Result<NewRecipe, TypeError> {
        if self.processing_status.trim().is_empty() {
            return Err(TypeError::new("processing_status is required"));
        }

        let link = parse_web_url(&self.youtube_url)?;
        let video_id = extract_video_id(link.as_str())
            .ok_or_else(|| TypeError::new("Invalid URL; Not a YouTube video link"))?;

        let metadata = self.metadata.clone().unwrap_or_default();
        if let Some(reported) = clean_optional(metadata.video_id.as_deref()) {
            if reported != video_id {
                log::warn!("Metadata video id {reported} differs from link video id {video_id}");
            }
        }

        let thumbnail = match clean_optional(metadata.thumbnail_url.as_deref()) {
            Some(thumbnail) => Some(parse_web_url(&thumbnail)?.to_string()),
            None => None,
        };

        let title = clean_optional(self.title.as_deref())
            .or_else(|| clean_optional(metadata.title.as_deref()))
            .unwrap_or_else(|| UNTITLED_RECIPE.to_string());

        let ingredient_names = self
            .ingredients
            .iter()
            .map(IngredientForm::stored_name)
            .collect::<Result<Vec<String>, TypeError>>()?;

        let category = match &self.cuisine_info {
            Some(info) => Some(info.category()?),
            None => None,
        };

        Ok(NewRecipe {
            link: self.youtube_url.trim().to_string(),
            video_id,
            title,
            thumbnail,
            author_name: clean_optional(metadata.author_name.as_deref())
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            author_url: clean_optional(metadata.author_url.as_deref()),
            category,
            ingredient_names,
            transcript: clean_optional(self.transcript.as_deref()),
        })
    }
}

// Authentication

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInForm {
    pub id_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshForm {
    pub refresh_token: Option<String>,
}
