use crate::import::ImportStats;
use crate::mapping::StagingRow;
use chrono::{DateTime, Utc};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use uuid::Uuid;

// ===== Response envelope =====

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl ResponseMeta {
    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::default(),
        }
    }

    pub fn with_meta(data: T, meta: ResponseMeta) -> Self {
        Self { data, meta }
    }
}

// ===== Requests =====

/// Target language of a CMC conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Translation {
    English,
    German,
    French,
    Italian,
    Spanish,
}

/// Import of one or more Nooko recipes into CMWeb.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImportRequest {
    /// Tenant key used to look up the CMWeb connection string.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Nooko payload: `{recipes: [{content}]}`, `{content}`, a
    /// `RecipeOutput` envelope or a bare recipe.
    pub nooko_json: JsonValue,
    /// Passed to the receiving procedure as `FileName`.
    #[serde(default)]
    pub batch_label: Option<String>,
    #[serde(default)]
    pub code_site: Option<i32>,
    #[serde(default)]
    pub code_user: Option<i32>,
    #[serde(default)]
    pub site_language: Option<i32>,
}

impl ImportRequest {
    pub fn batch_label(&self) -> String {
        self.batch_label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(default_batch_label)
    }
}

pub fn default_batch_label() -> String {
    format!("nooko-import-{}", Uuid::new_v4().simple())
}

/// Mapping or conversion of a Nooko payload without touching the database.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConvertRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub translation: Option<Translation>,
    pub nooko_json: JsonValue,
}

// ===== Responses =====

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    /// Batch id assigned by the receiving system.
    pub id_main: i32,
    pub batch_label: String,
    /// Titles of the imported recipes, in payload order.
    pub recipes: Vec<String>,
    pub staged_rows: u64,
    pub trailing_result_sets: usize,
    pub imported_at: DateTime<Utc>,
}

impl ImportResponse {
    pub fn new(batch_label: String, recipes: Vec<String>, stats: ImportStats) -> Self {
        Self {
            success: true,
            message: "Mapped and imported successfully.".to_string(),
            id_main: stats.id_main,
            batch_label,
            recipes,
            staged_rows: stats.staged_rows,
            trailing_result_sets: stats.trailing_result_sets,
            imported_at: Utc::now(),
        }
    }
}

/// Staging rows a payload maps to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MappedRecipes {
    pub recipes: Vec<String>,
    pub row_count: usize,
    pub rows: Vec<StagingRow>,
}

/// CMC import payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConvertResponse {
    pub success: bool,
    pub message: String,
    pub result: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServiceStatus {
    pub service: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionStatus {
    pub status: String,
    /// `"api_key"` when the connection was resolved through the lookup service.
    pub source: String,
}
