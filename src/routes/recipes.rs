//! Nooko recipe mapping, import and CMC conversion.

use crate::config::ServiceConfig;
use crate::connection::ConnectionProvider;
use crate::error::ApiError;
use crate::import::{BatchRequest, CmwebImporter};
use crate::mapping::cmc::{attach_translation, build_import_payload, map_nooko_to_cmc};
use crate::mapping::map_recipes;
use crate::models::{
    ApiResponse, ConvertRequest, ConvertResponse, ImportRequest, ImportResponse, MappedRecipes,
    ResponseMeta,
};
use crate::recipe::{RecipeDocument, ValidationError, extract_recipe_documents};
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;
use std::time::Instant;

fn titles(recipes: &[RecipeDocument]) -> Vec<String> {
    recipes.iter().map(|recipe| recipe.title.clone()).collect()
}

/// Preview the staging rows a payload maps to. No database work.
#[openapi(tag = "Recipes")]
#[post("/recipes/map/nooko-to-cmw", data = "<request>")]
pub fn map_nooko_to_cmw(
    request: Json<ConvertRequest>,
    config: &State<ServiceConfig>,
) -> Result<Json<ApiResponse<MappedRecipes>>, ApiError> {
    let recipes = extract_recipe_documents(&request.nooko_json)?;
    let rows = map_recipes(&recipes);

    Ok(Json(ApiResponse::with_meta(
        MappedRecipes {
            recipes: titles(&recipes),
            row_count: rows.len(),
            rows,
        },
        ResponseMeta::default().with_service_id(config.service_id.clone()),
    )))
}

/// Validate, map and import a Nooko payload as one CMWeb batch.
///
/// The staging insert and both procedure calls share one transaction; any
/// failure rolls it back and is reported with the failing step.
#[openapi(tag = "Recipes")]
#[post("/recipes/import/nooko-to-cmw", data = "<request>")]
pub async fn import_nooko_to_cmw(
    request: Json<ImportRequest>,
    config: &State<ServiceConfig>,
    provider: &State<ConnectionProvider>,
) -> Result<Json<ApiResponse<ImportResponse>>, ApiError> {
    let start = Instant::now();
    let request = request.into_inner();

    let recipes = extract_recipe_documents(&request.nooko_json)?;
    let rows = map_recipes(&recipes);

    let defaults = config.import_defaults;
    let batch = BatchRequest {
        batch_label: request.batch_label(),
        code_site: request.code_site.unwrap_or(defaults.code_site),
        code_user: request.code_user.unwrap_or(defaults.code_user),
        site_language: request.site_language.unwrap_or(defaults.site_language),
    };

    let mut conn = provider.acquire(request.api_key.as_deref()).await?;
    let stats = CmwebImporter::new(config.statement_timeout)
        .import(&mut conn, &rows, &batch)
        .await?;

    let meta = ResponseMeta::default()
        .with_service_id(config.service_id.clone())
        .with_latency_ms(start.elapsed().as_millis() as u64);

    Ok(Json(ApiResponse::with_meta(
        ImportResponse::new(batch.batch_label, titles(&recipes), stats),
        meta,
    )))
}

/// Convert a Nooko payload into the CalcMenu Cloud import body.
#[openapi(tag = "Recipes")]
#[post("/recipes/convert/nooko-to-cmc", data = "<request>")]
pub fn convert_nooko_to_cmc(
    request: Json<ConvertRequest>,
    config: &State<ServiceConfig>,
) -> Result<Json<ApiResponse<ConvertResponse>>, ApiError> {
    if !request.nooko_json.is_object() {
        return Err(ValidationError::NotAnObject.into());
    }

    let mut recipes = map_nooko_to_cmc(&request.nooko_json);
    if recipes.is_empty() {
        return Err(ValidationError::NoRecipes.into());
    }
    if let Some(translation) = request.translation {
        recipes = attach_translation(&recipes, translation);
    }

    let api_key = request.api_key.as_deref().unwrap_or_default();
    let result = build_import_payload(api_key, &recipes)
        .map_err(|err| ApiError::InternalError(format!("failed to encode CMC recipe: {err}")))?;

    Ok(Json(ApiResponse::with_meta(
        ConvertResponse {
            success: true,
            message: format!("Converted {} recipe(s).", recipes.len()),
            result,
        },
        ResponseMeta::default().with_service_id(config.service_id.clone()),
    )))
}
