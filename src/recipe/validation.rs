//! Structural validation of incoming Nooko payloads.
//!
//! Nothing downstream of this module re-checks shape: the mapper assumes
//! every [`RecipeDocument`] it receives passed through here.

use super::document::{RecipeDocument, RecipeOutput};
use serde_json::Value;
use thiserror::Error;

/// Rejection raised before any database work is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("payload does not contain any recipes")]
    NoRecipes,
    #[error("recipes[{index}] must be an object with a `content` object")]
    MissingContent { index: usize },
    #[error("recipe {index} is invalid: {message}")]
    Schema { index: usize, message: String },
    #[error("invalid recipe output envelope: {0}")]
    Envelope(String),
    #[error("recipe_json must be {{}} when is_recipe=false")]
    UnexpectedRecipeJson,
    #[error("payload is not a recipe (is_recipe=false)")]
    NotARecipe,
}

impl RecipeOutput {
    /// Apply the conditional rule of the envelope.
    ///
    /// Returns `Ok(None)` for a well-formed non-recipe answer
    /// (`is_recipe=false` with `recipe_json: {}`).
    pub fn into_document(self) -> Result<Option<RecipeDocument>, ValidationError> {
        if self.is_recipe {
            parse_document(0, self.recipe_json).map(Some)
        } else if self.recipe_json.as_object().is_some_and(|map| map.is_empty()) {
            Ok(None)
        } else {
            Err(ValidationError::UnexpectedRecipeJson)
        }
    }
}

/// Unwrap every recipe contained in a Nooko payload and validate each one.
///
/// Accepted shapes:
/// * a recipe object,
/// * `{"content": {...}}`,
/// * `{"recipes": [{"content": {...}}, ...]}` (multi-recipe export),
/// * a generator envelope carrying `is_recipe` / `recipe_json`.
pub fn extract_recipe_documents(payload: &Value) -> Result<Vec<RecipeDocument>, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(recipes) = object.get("recipes").and_then(Value::as_array) {
        if recipes.is_empty() {
            return Err(ValidationError::NoRecipes);
        }

        return recipes
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let content = item
                    .get("content")
                    .filter(|content| content.is_object())
                    .ok_or(ValidationError::MissingContent { index })?;
                parse_document(index, content.clone())
            })
            .collect();
    }

    if let Some(content) = object.get("content").filter(|content| content.is_object()) {
        return parse_document(0, content.clone()).map(|recipe| vec![recipe]);
    }

    if object.contains_key("is_recipe") {
        let output: RecipeOutput = serde_json::from_value(payload.clone())
            .map_err(|err| ValidationError::Envelope(err.to_string()))?;
        return match output.into_document()? {
            Some(recipe) => Ok(vec![recipe]),
            None => Err(ValidationError::NotARecipe),
        };
    }

    parse_document(0, payload.clone()).map(|recipe| vec![recipe])
}

fn parse_document(index: usize, value: Value) -> Result<RecipeDocument, ValidationError> {
    serde_json::from_value(value).map_err(|err| ValidationError::Schema {
        index,
        message: err.to_string(),
    })
}
