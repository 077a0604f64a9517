use recipe_import::api_routes;
use recipe_import::mapping::StagingRow;
use recipe_import::models::{ApiResponse, ConvertResponse, MappedRecipes};
use recipe_import::test_support::TestRocketBuilder;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use rocket::serde::json::{Value, json};

fn soup_json() -> Value {
    json!({
        "title": "Soup",
        "description": "A warming broth",
        "servings": "4",
        "prep_time": "10 min",
        "cook_time": "20 min",
        "total_time": "30 min",
        "difficulty": "easy",
        "cuisine": "French",
        "category": "Starter",
        "ingredients": [
            {"sequence": 1, "name": "Salt", "amount": "1", "unit": "tsp", "notes": ""}
        ],
        "instructions": ["Boil water"],
        "dietary_tags": [],
        "allergens": [],
        "equipment": ["Pot"],
        "notes": "Serve hot",
        "serving_suggestions": [],
        "wine_pairing": "",
        "images": [],
        "infographics": [],
        "source_system": "ai-generated",
        "calcmenu_reference": {
            "recipe_number": "",
            "reference_id": "",
            "database_name": "",
            "code_site": "",
            "code_group": ""
        }
    })
}

fn client() -> Client {
    TestRocketBuilder::new()
        .mount_api_routes(api_routes())
        .blocking_client()
}

#[test]
fn map_preview_returns_staging_rows() {
    let client = client();
    let response = client
        .post("/api/v1/recipes/map/nooko-to-cmw")
        .header(ContentType::JSON)
        .body(json!({ "nooko_json": { "content": soup_json() } }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let payload: ApiResponse<MappedRecipes> = response.into_json().expect("valid JSON payload");

    assert_eq!(payload.data.recipes, ["Soup"]);
    assert_eq!(payload.data.row_count, 15);
    assert_eq!(
        payload.data.rows[2],
        StagingRow::from(["", "Yield", "4", "serving", "", "", "", ""])
    );
    assert_eq!(
        payload.data.rows[12],
        StagingRow::from(["", "Salt", "", "1", "tsp", "0", "", ""])
    );
}

#[test]
fn invalid_recipe_is_rejected_before_database_work() {
    let mut recipe = soup_json();
    recipe["difficulty"] = json!("impossible");

    let client = client();
    let response = client
        .post("/api/v1/recipes/import/nooko-to-cmw")
        .header(ContentType::JSON)
        .body(json!({ "api_key": "tenant", "nooko_json": recipe }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().expect("error body");
    assert_eq!(body["error"], "ValidationError");
}

#[test]
fn import_without_connection_source_is_a_client_error() {
    let client = client();
    let response = client
        .post("/api/v1/recipes/import/nooko-to-cmw")
        .header(ContentType::JSON)
        .body(json!({ "nooko_json": soup_json() }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().expect("error body");
    assert_eq!(body["error"], "BadRequest");
}

#[test]
fn convert_builds_numbered_cmc_payload() {
    let mut stew = soup_json();
    stew["title"] = json!("Stew");

    let client = client();
    let response = client
        .post("/api/v1/recipes/convert/nooko-to-cmc")
        .header(ContentType::JSON)
        .body(
            json!({
                "api_key": " key-1 ",
                "translation": "German",
                "nooko_json": {
                    "recipes": [ { "content": soup_json() }, { "content": stew } ]
                }
            })
            .to_string(),
        )
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let payload: ApiResponse<ConvertResponse> = response.into_json().expect("valid JSON payload");
    let result = payload.data.result;

    assert_eq!(result["api_key"], "key-1");
    assert_eq!(result["converted_recipe-1"]["RecipeName"], "Soup");
    assert_eq!(result["converted_recipe-2"]["RecipeName"], "Stew");
    assert_eq!(result["converted_recipe-2"]["translation"], "German");
}

#[test]
fn convert_rejects_non_object_payload() {
    let client = client();
    let response = client
        .post("/api/v1/recipes/convert/nooko-to-cmc")
        .header(ContentType::JSON)
        .body(json!({ "nooko_json": [1, 2, 3] }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
fn openapi_document_lists_recipe_routes() {
    let client = client();
    let response = client.get("/api/v1/openapi.json").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let document: Value = response.into_json().expect("openapi document");
    let paths = document["paths"].as_object().expect("paths object");
    assert!(paths.contains_key("/recipes/import/nooko-to-cmw"));
    assert!(paths.contains_key("/recipes/map/nooko-to-cmw"));
    assert!(paths.contains_key("/cmweb/connection/validate"));
}
