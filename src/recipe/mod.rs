//! Nooko recipe documents.
//!
//! The types in [`document`] mirror the JSON produced by the Nooko recipe
//! generator. They reject unknown fields, so a successful deserialization is
//! the structural validation every document must pass before it is mapped.
//! [`validation`] unwraps the different envelope shapes Nooko emits
//! (single recipe, `content` wrapper, multi-recipe export, `RecipeOutput`).

pub mod document;
pub mod validation;

pub use document::{
    CalcmenuReference, Difficulty, Ingredient, MediaItem, RecipeDocument, RecipeOutput,
    SourceSystem,
};
pub use validation::{ValidationError, extract_recipe_documents};
