//! Nooko recipe → CMWeb staging rows.

use super::staging_row::{HeaderLabel, StagingRow, TemplateRow, YIELD_UNIT};
use crate::recipe::RecipeDocument;

/// Number of rows emitted for a recipe regardless of its body: the header
/// block plus the ingredient and procedure block headers.
pub const FIXED_ROW_COUNT: usize = HeaderLabel::ALL.len() + 2;

/// Map one recipe to the ordered staging rows the import procedure expects.
///
/// Pure and total: empty ingredient or instruction lists still produce both
/// block headers, just without body rows.
pub fn map_recipe(recipe: &RecipeDocument) -> Vec<StagingRow> {
    let mut rows = Vec::with_capacity(expected_row_count(recipe));
    rows.extend(template_rows(recipe).map(TemplateRow::into_staging_row));
    rows
}

/// Map several recipes into one staging batch, one block per recipe.
pub fn map_recipes(recipes: &[RecipeDocument]) -> Vec<StagingRow> {
    let capacity = recipes.iter().map(expected_row_count).sum();
    let mut rows = Vec::with_capacity(capacity);
    for recipe in recipes {
        rows.extend(template_rows(recipe).map(TemplateRow::into_staging_row));
    }
    rows
}

pub fn expected_row_count(recipe: &RecipeDocument) -> usize {
    FIXED_ROW_COUNT + recipe.ingredients.len() + recipe.instructions.len()
}

fn template_rows(recipe: &RecipeDocument) -> impl Iterator<Item = TemplateRow<'_>> {
    header_rows(recipe)
        .into_iter()
        .chain(std::iter::once(TemplateRow::IngredientHeader))
        .chain(recipe.ingredients.iter().map(TemplateRow::Ingredient))
        .chain(std::iter::once(TemplateRow::ProcedureHeader))
        .chain(recipe.instructions.iter().map(|step| TemplateRow::Step(step)))
}

fn header_rows(recipe: &RecipeDocument) -> [TemplateRow<'_>; 11] {
    HeaderLabel::ALL.map(|label| match label {
        HeaderLabel::Name => TemplateRow::header(label, &recipe.title),
        HeaderLabel::Yield => TemplateRow::Header {
            label,
            value: &recipe.servings,
            unit: YIELD_UNIT,
        },
        HeaderLabel::Source => TemplateRow::header(label, recipe.source_system.as_str()),
        HeaderLabel::Category => TemplateRow::header(label, &recipe.category),
        HeaderLabel::Description => TemplateRow::header(label, &recipe.description),
        HeaderLabel::Notes => TemplateRow::header(label, &recipe.notes),
        HeaderLabel::DisplayNutrition => {
            TemplateRow::header(label, super::staging_row::DISPLAY_NUTRITION)
        }
        // Not provided by Nooko.
        HeaderLabel::Number
        | HeaderLabel::Subrecipe
        | HeaderLabel::Remark
        | HeaderLabel::AdditionalNotes => TemplateRow::header(label, ""),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::staging_row::{COLUMN_COUNT, INGREDIENT_HEADER, PROCEDURE_HEADER};
    use crate::recipe::Ingredient;
    use crate::recipe::document::fixtures::soup;

    fn ingredient(name: &str, amount: &str, unit: &str, notes: &str) -> Ingredient {
        Ingredient {
            sequence: 0.0,
            name: name.to_string(),
            amount: amount.to_string(),
            unit: unit.to_string(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn soup_maps_to_expected_rows() {
        let rows = map_recipe(&soup());

        assert_eq!(
            rows[2],
            StagingRow::from(["", "Yield", "4", "serving", "", "", "", ""])
        );
        assert_eq!(
            rows[12],
            StagingRow::from(["", "Salt", "", "1", "tsp", "0", "", ""])
        );
        assert_eq!(
            rows[14],
            StagingRow::from(["", "Boil water", "", "", "", "", "", ""])
        );
        assert_eq!(rows.len(), 15);
    }

    #[test]
    fn header_block_follows_fixed_order() {
        let rows = map_recipe(&soup());
        let labels: Vec<&str> = rows.iter().take(11).map(StagingRow::label).collect();
        assert_eq!(
            labels,
            [
                "Name",
                "Number",
                "Yield",
                "Subrecipe",
                "Source",
                "Category",
                "Remark",
                "Description",
                "Notes",
                "Additional Notes",
                "Display Nutrition",
            ]
        );

        assert_eq!(rows[0].columns()[..3], ["Recipe", "Name", "Soup"]);
        assert_eq!(rows[4].column(2), "ai-generated");
        assert_eq!(rows[5].column(2), "Starter");
        assert_eq!(rows[7].column(2), "A warming broth");
        assert_eq!(rows[8].column(2), "Serve hot");
        assert_eq!(rows[10].column(2), "Yes");
        for blank in [1, 3, 6, 9] {
            assert_eq!(rows[blank].column(2), "", "row {blank} should be blank");
        }
    }

    #[test]
    fn every_row_has_eight_text_columns() {
        let mut recipe = soup();
        recipe.ingredients.push(ingredient("Pepper", "", "", "freshly ground"));
        recipe.instructions.push("Season".to_string());

        for row in map_recipe(&recipe) {
            assert_eq!(row.columns().len(), COLUMN_COUNT);
        }
    }

    #[test]
    fn empty_body_still_emits_block_headers() {
        let mut recipe = soup();
        recipe.ingredients.clear();
        recipe.instructions.clear();

        let rows = map_recipe(&recipe);
        assert_eq!(rows.len(), FIXED_ROW_COUNT);
        assert_eq!(rows[11], StagingRow::from(INGREDIENT_HEADER));
        assert_eq!(rows[12].label(), PROCEDURE_HEADER);
    }

    #[test]
    fn row_count_matches_body_size() {
        let mut recipe = soup();
        recipe.ingredients = (0..5)
            .map(|i| ingredient(&format!("item {i}"), "1", "g", ""))
            .collect();
        recipe.instructions = (0..3).map(|i| format!("step {i}")).collect();

        let rows = map_recipe(&recipe);
        assert_eq!(rows.len(), 11 + 1 + 5 + 1 + 3);
        assert_eq!(rows.len(), expected_row_count(&recipe));
    }

    #[test]
    fn body_rows_preserve_source_order() {
        let mut recipe = soup();
        recipe.ingredients = vec![
            ingredient("Onion", "2", "pc", "diced"),
            ingredient("Butter", "30", "g", ""),
            ingredient("Stock", "1", "l", ""),
        ];
        recipe.instructions = vec![
            "Melt butter".to_string(),
            "Sweat onion".to_string(),
            "Add stock".to_string(),
        ];

        let rows = map_recipe(&recipe);
        let ingredient_header = rows
            .iter()
            .position(|row| row.label() == "Ingredient Name")
            .expect("ingredient header");
        let procedure_header = rows
            .iter()
            .position(|row| row.label() == PROCEDURE_HEADER)
            .expect("procedure header");

        assert!(ingredient_header < procedure_header);

        let ingredients: Vec<&str> = rows[ingredient_header + 1..procedure_header]
            .iter()
            .map(StagingRow::label)
            .collect();
        assert_eq!(ingredients, ["Onion", "Butter", "Stock"]);
        assert_eq!(rows[ingredient_header + 1].column(7), "diced");

        let steps: Vec<&str> = rows[procedure_header + 1..]
            .iter()
            .map(StagingRow::label)
            .collect();
        assert_eq!(steps, ["Melt butter", "Sweat onion", "Add stock"]);
    }

    #[test]
    fn mapping_is_repeatable() {
        let recipe = soup();
        assert_eq!(map_recipe(&recipe), map_recipe(&recipe));
    }

    #[test]
    fn multiple_recipes_are_concatenated_in_order() {
        let first = soup();
        let mut second = soup();
        second.title = "Stew".to_string();

        let rows = map_recipes(&[first.clone(), second.clone()]);
        assert_eq!(rows.len(), expected_row_count(&first) + expected_row_count(&second));

        let names: Vec<&str> = rows
            .iter()
            .filter(|row| row.column(0) == "Recipe")
            .map(|row| row.column(2))
            .collect();
        assert_eq!(names, ["Soup", "Stew"]);
        assert_eq!(rows[..15], map_recipe(&first)[..]);
    }
}
