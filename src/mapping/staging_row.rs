//! Staging rows of the CMWeb recipe import template.
//!
//! The receiving procedure reads the staging table positionally: a row's
//! role is identified by the literal label in its second column and by its
//! position inside a labelled block. Rows are therefore built as a typed
//! [`TemplateRow`] and only flattened to the untyped 8-column
//! [`StagingRow`] at the very end.

use crate::recipe::Ingredient;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of text columns in `EgswRecipeImportTemplate`.
pub const COLUMN_COUNT: usize = 8;

/// Yield unit written for every recipe; Nooko only knows servings.
pub const YIELD_UNIT: &str = "serving";
/// Value of the `Display Nutrition` header row.
pub const DISPLAY_NUTRITION: &str = "Yes";
/// Wastage written for every ingredient.
pub const DEFAULT_WASTAGE: &str = "0";

/// Column labels of the ingredient block header row.
pub const INGREDIENT_HEADER: [&str; COLUMN_COUNT] = [
    "",
    "Ingredient Name",
    "Number",
    "Quantity",
    "Unit",
    "Wastage",
    "Complement",
    "Preparation",
];

/// Label of the procedure block header row.
pub const PROCEDURE_HEADER: &str = "Procedure";

/// One row of the staging table: exactly eight text columns, never null.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StagingRow([String; COLUMN_COUNT]);

impl StagingRow {
    pub fn columns(&self) -> &[String; COLUMN_COUNT] {
        &self.0
    }

    pub fn column(&self, index: usize) -> &str {
        &self.0[index]
    }

    /// The role label read by the receiving procedure (column 2).
    pub fn label(&self) -> &str {
        &self.0[1]
    }
}

impl From<[&str; COLUMN_COUNT]> for StagingRow {
    fn from(columns: [&str; COLUMN_COUNT]) -> Self {
        Self(columns.map(str::to_owned))
    }
}

/// Labels of the fixed recipe header block, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLabel {
    Name,
    Number,
    Yield,
    Subrecipe,
    Source,
    Category,
    Remark,
    Description,
    Notes,
    AdditionalNotes,
    DisplayNutrition,
}

impl HeaderLabel {
    pub const ALL: [HeaderLabel; 11] = [
        HeaderLabel::Name,
        HeaderLabel::Number,
        HeaderLabel::Yield,
        HeaderLabel::Subrecipe,
        HeaderLabel::Source,
        HeaderLabel::Category,
        HeaderLabel::Remark,
        HeaderLabel::Description,
        HeaderLabel::Notes,
        HeaderLabel::AdditionalNotes,
        HeaderLabel::DisplayNutrition,
    ];

    /// Literal understood by the receiving procedure (case-sensitive).
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderLabel::Name => "Name",
            HeaderLabel::Number => "Number",
            HeaderLabel::Yield => "Yield",
            HeaderLabel::Subrecipe => "Subrecipe",
            HeaderLabel::Source => "Source",
            HeaderLabel::Category => "Category",
            HeaderLabel::Remark => "Remark",
            HeaderLabel::Description => "Description",
            HeaderLabel::Notes => "Notes",
            HeaderLabel::AdditionalNotes => "Additional Notes",
            HeaderLabel::DisplayNutrition => "Display Nutrition",
        }
    }
}

/// Typed form of a staging row before it is flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateRow<'a> {
    /// A line of the recipe header block. `unit` is only used by `Yield`.
    Header {
        label: HeaderLabel,
        value: &'a str,
        unit: &'static str,
    },
    IngredientHeader,
    Ingredient(&'a Ingredient),
    ProcedureHeader,
    Step(&'a str),
}

impl TemplateRow<'_> {
    pub fn header(label: HeaderLabel, value: &str) -> TemplateRow<'_> {
        TemplateRow::Header {
            label,
            value,
            unit: "",
        }
    }

    pub fn into_staging_row(self) -> StagingRow {
        match self {
            TemplateRow::Header { label, value, unit } => {
                // Only the first header line opens a new recipe block.
                let marker = if label == HeaderLabel::Name { "Recipe" } else { "" };
                StagingRow::from([marker, label.as_str(), value, unit, "", "", "", ""])
            }
            TemplateRow::IngredientHeader => StagingRow::from(INGREDIENT_HEADER),
            TemplateRow::Ingredient(ingredient) => StagingRow::from([
                "",
                ingredient.name.as_str(),
                "",
                ingredient.amount.as_str(),
                ingredient.unit.as_str(),
                DEFAULT_WASTAGE,
                "",
                ingredient.notes.as_str(),
            ]),
            TemplateRow::ProcedureHeader => {
                StagingRow::from(["", PROCEDURE_HEADER, "", "", "", "", "", ""])
            }
            TemplateRow::Step(step) => StagingRow::from(["", step, "", "", "", "", "", ""]),
        }
    }
}

/// Columnar copy of a row sequence, one vector per table column.
///
/// Row `i` of the input is element `i` of every vector, which is the layout
/// `UNNEST(... ) WITH ORDINALITY` expects.
#[derive(Debug, Default)]
pub struct TemplateColumns {
    pub columns: [Vec<String>; COLUMN_COUNT],
}

impl TemplateColumns {
    pub fn from_rows(rows: &[StagingRow]) -> Self {
        let mut columns: [Vec<String>; COLUMN_COUNT] =
            std::array::from_fn(|_| Vec::with_capacity(rows.len()));

        for row in rows {
            for (column, value) in columns.iter_mut().zip(row.columns()) {
                column.push(value.clone());
            }
        }

        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
