//! Translation of Nooko recipes into CMWeb formats.
//!
//! * [`template_mapper`] produces the positional staging rows consumed by the
//!   `usp_RecipeImport_xls` import procedure.
//! * [`cmc`] produces the CalcMenu Cloud JSON payload.
//!
//! Both are pure: no I/O, no hidden state.

pub mod cmc;
pub mod staging_row;
pub mod template_mapper;

pub use staging_row::{COLUMN_COUNT, StagingRow, TemplateColumns, TemplateRow};
pub use template_mapper::{map_recipe, map_recipes};
