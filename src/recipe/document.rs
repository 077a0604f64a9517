use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single Nooko recipe (`recipe_json` in the generator output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecipeDocument {
    pub title: String,
    pub description: String,
    /// Textual quantity. Numeric JSON values are accepted and kept verbatim.
    #[serde(deserialize_with = "text_or_number")]
    #[schemars(with = "String")]
    pub servings: String,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub category: String,
    /// Ordered; the order becomes staging-row order.
    pub ingredients: Vec<Ingredient>,
    /// Ordered cooking steps.
    pub instructions: Vec<String>,
    pub dietary_tags: Vec<String>,
    pub allergens: Vec<String>,
    pub equipment: Vec<String>,
    pub notes: String,
    pub serving_suggestions: Vec<String>,
    pub wine_pairing: String,
    pub images: Vec<MediaItem>,
    pub infographics: Vec<MediaItem>,
    pub source_system: SourceSystem,
    pub calcmenu_reference: CalcmenuReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub sequence: f64,
    pub name: String,
    /// Amount stays text; no unit or number parsing happens here.
    #[serde(deserialize_with = "text_or_number")]
    #[schemars(with = "String")]
    pub amount: String,
    pub unit: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MediaItem {
    pub url: String,
    pub name: Option<String>,
    pub alt: String,
    pub caption: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub format: Option<String>,
    pub size_bytes: Option<f64>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub step_index: Option<f64>,
    pub attribution: Option<String>,
    pub license: Option<String>,
    pub copyright: Option<String>,
    pub seo_keywords: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CalcmenuReference {
    pub recipe_number: String,
    pub reference_id: String,
    pub database_name: String,
    pub code_site: String,
    pub code_group: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Origin marker of a Nooko document. Only generated recipes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SourceSystem {
    #[serde(rename = "ai-generated")]
    AiGenerated,
}

impl SourceSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSystem::AiGenerated => "ai-generated",
        }
    }
}

/// Envelope returned by the Nooko generator.
///
/// `recipe_json` is kept as raw JSON because its shape depends on
/// `is_recipe`; see [`crate::recipe::validation`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecipeOutput {
    pub response_plain: String,
    pub is_recipe: bool,
    #[serde(default = "empty_object")]
    pub recipe_json: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Accept a JSON string, number or null and keep it as text.
///
/// Numbers use their JSON spelling (`4` stays `"4"`, `2.5` stays `"2.5"`);
/// null becomes the empty string.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(number)) => number.to_string(),
        None => String::new(),
    })
}
