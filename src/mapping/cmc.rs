//! Nooko recipe → CalcMenu Cloud (CMC) JSON payload.
//!
//! Unlike the staging-row mapper this works on raw JSON and is lenient:
//! missing or mistyped fields fall back to empty strings and zero amounts,
//! so the conversion can be previewed for payloads that would not pass
//! import validation.

use crate::models::Translation;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CmcRecipe {
    #[serde(rename = "RecipeNumber")]
    pub recipe_number: String,
    #[serde(rename = "RecipeName")]
    pub recipe_name: String,
    #[serde(rename = "AlternativeName")]
    pub alternative_name: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "RecipeImage")]
    pub recipe_image: String,
    #[serde(rename = "PictureName")]
    pub picture_name: String,
    #[serde(rename = "isSubRecipe")]
    pub is_sub_recipe: bool,
    #[serde(rename = "srQty")]
    pub sr_qty: f64,
    #[serde(rename = "srUnit")]
    pub sr_unit: String,
    #[serde(rename = "Yield")]
    pub yield_info: CmcYield,
    #[serde(rename = "Description")]
    pub description: CmcDescription,
    #[serde(rename = "ServingSize")]
    pub serving_size: CmcServingSize,
    #[serde(rename = "Ingredients")]
    pub ingredients: Vec<CmcIngredient>,
    #[serde(rename = "Procedure")]
    pub procedure: Vec<CmcProcedureStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Translation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CmcYield {
    #[serde(rename = "YieldQty")]
    pub quantity: f64,
    #[serde(rename = "YieldUnit")]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CmcDescription {
    #[serde(rename = "Description")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CmcServingSize {
    #[serde(rename = "ServingAmount")]
    pub amount: f64,
    #[serde(rename = "ServingUnit")]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CmcIngredient {
    #[serde(rename = "Number")]
    pub number: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Complement")]
    pub complement: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Wastage1")]
    pub wastage1: f64,
    #[serde(rename = "Wastage2")]
    pub wastage2: f64,
    #[serde(rename = "Wastage3")]
    pub wastage3: f64,
    #[serde(rename = "Wastage4")]
    pub wastage4: f64,
    #[serde(rename = "Wastage5")]
    pub wastage5: f64,
    #[serde(rename = "showIngredientPercentage")]
    pub show_ingredient_percentage: bool,
    #[serde(rename = "codeAccounting")]
    pub code_accounting: i32,
    pub preparation: String,
    #[serde(rename = "AlternativeName")]
    pub alternative_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CmcProcedureStep {
    #[serde(rename = "Step")]
    pub step: String,
    #[serde(rename = "Instruction")]
    pub instruction: String,
}

/// Convert every recipe found in a Nooko payload.
///
/// Accepts a bare recipe, a `{"content": {...}}` wrapper or a multi-recipe
/// export (`{"recipes": [{"content": {...}}]}`); export items without a
/// `content` object are skipped.
pub fn map_nooko_to_cmc(payload: &Value) -> Vec<CmcRecipe> {
    recipe_contents(payload).into_iter().map(map_one).collect()
}

/// Return copies of `recipes` tagged with the requested translation.
pub fn attach_translation(recipes: &[CmcRecipe], translation: Translation) -> Vec<CmcRecipe> {
    recipes
        .iter()
        .cloned()
        .map(|recipe| CmcRecipe {
            translation: Some(translation),
            ..recipe
        })
        .collect()
}

/// Build the CMC import body: `api_key` followed by `converted_recipe-N`
/// entries numbered from 1.
pub fn build_import_payload(
    api_key: &str,
    recipes: &[CmcRecipe],
) -> Result<Map<String, Value>, serde_json::Error> {
    let mut payload = Map::new();
    payload.insert("api_key".to_string(), Value::String(api_key.trim().to_string()));

    for (idx, recipe) in recipes.iter().enumerate() {
        payload.insert(
            format!("converted_recipe-{}", idx + 1),
            serde_json::to_value(recipe)?,
        );
    }

    Ok(payload)
}

fn recipe_contents(payload: &Value) -> Vec<&Value> {
    if let Some(recipes) = payload.get("recipes").and_then(Value::as_array) {
        return recipes
            .iter()
            .filter_map(|item| item.get("content").filter(|content| content.is_object()))
            .collect();
    }

    match payload.get("content") {
        Some(content) if content.is_object() => vec![content],
        _ => vec![payload],
    }
}

fn map_one(recipe: &Value) -> CmcRecipe {
    CmcRecipe {
        recipe_number: String::new(),
        recipe_name: as_text(recipe.get("title")),
        alternative_name: String::new(),
        category: as_text(recipe.get("category")),
        source: as_text(recipe.get("source_system")),
        author: String::new(),
        recipe_image: String::new(),
        picture_name: String::new(),
        is_sub_recipe: false,
        sr_qty: 0.0,
        sr_unit: String::new(),
        yield_info: CmcYield {
            quantity: as_float(recipe.get("servings")),
            unit: "serving".to_string(),
        },
        description: CmcDescription {
            text: as_text(recipe.get("description")),
        },
        serving_size: CmcServingSize {
            amount: 0.0,
            unit: String::new(),
        },
        ingredients: map_ingredients(recipe.get("ingredients")),
        procedure: map_procedure(recipe.get("instructions")),
        translation: None,
    }
}

fn map_ingredients(ingredients: Option<&Value>) -> Vec<CmcIngredient> {
    let Some(items) = ingredients.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| CmcIngredient {
            number: as_text(item.get("sequence")),
            name: as_text(item.get("name")),
            unit: as_text(item.get("unit")),
            quantity: as_float(item.get("amount")),
            complement: as_text(item.get("notes")),
            price: 0.0,
            amount: 0.0,
            wastage1: 0.0,
            wastage2: 0.0,
            wastage3: 0.0,
            wastage4: 0.0,
            wastage5: 0.0,
            show_ingredient_percentage: false,
            code_accounting: 0,
            preparation: String::new(),
            alternative_name: String::new(),
        })
        .collect()
}

fn map_procedure(steps: Option<&Value>) -> Vec<CmcProcedureStep> {
    let Some(steps) = steps.and_then(Value::as_array) else {
        return Vec::new();
    };

    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| CmcProcedureStep {
            step: (idx + 1).to_string(),
            instruction: as_text(Some(step)),
        })
        .collect()
}

/// Trimmed text form of a JSON scalar; null and missing become "".
fn as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Numeric value of a JSON number or numeric string; anything else is 0.
fn as_float(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::document::fixtures::soup_json;
    use serde_json::json;

    #[test]
    fn maps_header_and_yield() {
        let recipes = map_nooko_to_cmc(&soup_json());
        assert_eq!(recipes.len(), 1);

        let recipe = &recipes[0];
        assert_eq!(recipe.recipe_name, "Soup");
        assert_eq!(recipe.category, "Starter");
        assert_eq!(recipe.source, "ai-generated");
        assert_eq!(recipe.yield_info.quantity, 4.0);
        assert_eq!(recipe.yield_info.unit, "serving");
        assert_eq!(recipe.description.text, "A warming broth");
    }

    #[test]
    fn ingredients_keep_sequence_and_parse_amounts() {
        let mut value = soup_json();
        value["ingredients"] = json!([
            {"sequence": 1, "name": " Salt ", "amount": "1.5", "unit": "tsp", "notes": "fine"},
            {"sequence": 2, "name": "Water", "amount": "a splash", "unit": "", "notes": ""},
            "not an ingredient"
        ]);

        let ingredients = &map_nooko_to_cmc(&value)[0].ingredients;
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0].number, "1");
        assert_eq!(ingredients[0].name, "Salt");
        assert_eq!(ingredients[0].quantity, 1.5);
        assert_eq!(ingredients[0].complement, "fine");
        assert_eq!(ingredients[1].quantity, 0.0);
    }

    #[test]
    fn procedure_steps_are_numbered_from_one() {
        let mut value = soup_json();
        value["instructions"] = json!(["Boil water", "Add salt"]);

        let steps = &map_nooko_to_cmc(&value)[0].procedure;
        assert_eq!(steps[0].step, "1");
        assert_eq!(steps[1].step, "2");
        assert_eq!(steps[1].instruction, "Add salt");
    }

    #[test]
    fn export_items_without_content_are_skipped() {
        let payload = json!({
            "recipes": [
                {"content": soup_json()},
                {"id": 7},
                {"content": soup_json()}
            ]
        });
        assert_eq!(map_nooko_to_cmc(&payload).len(), 2);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let recipe = &map_nooko_to_cmc(&json!({"title": "Bare"}))[0];
        assert_eq!(recipe.recipe_name, "Bare");
        assert_eq!(recipe.category, "");
        assert_eq!(recipe.yield_info.quantity, 0.0);
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.procedure.is_empty());
    }

    #[test]
    fn translation_is_injected_into_copies() {
        let recipes = map_nooko_to_cmc(&soup_json());
        let translated = attach_translation(&recipes, Translation::German);

        assert_eq!(recipes[0].translation, None);
        assert_eq!(translated[0].translation, Some(Translation::German));

        let json = serde_json::to_value(&translated[0]).expect("serializable");
        assert_eq!(json["translation"], "German");
        assert_eq!(json["Yield"]["YieldUnit"], "serving");
        assert_eq!(json["Description"]["Description"], "A warming broth");
    }

    #[test]
    fn import_payload_numbers_recipes() {
        let recipes = map_nooko_to_cmc(&json!({
            "recipes": [{"content": soup_json()}, {"content": soup_json()}]
        }));

        let payload = build_import_payload(" key-123 ", &recipes).expect("serializable");
        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();

        assert!(keys.contains(&"api_key"));
        assert!(keys.contains(&"converted_recipe-1"));
        assert!(keys.contains(&"converted_recipe-2"));
        assert_eq!(payload["api_key"], "key-123");
        assert_eq!(payload["converted_recipe-2"]["RecipeName"], "Soup");
    }
}
