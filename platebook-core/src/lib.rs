//! Database-free rules for Platebook: form validation, photo upload checks,
//! authorization policy and the typed dish filter used by the list endpoint.
//!
//! The server crate owns persistence and HTTP; everything here is plain data
//! in, plain data out, so it can be unit tested without Postgres.

pub mod dish_query;
pub mod error;
pub mod nutrient;
pub mod photo;
pub mod policy;
pub mod validation;

pub use dish_query::{
    DishFilter, NutrientAverages, Page, PageRequest, Range, SortField, SortKey, PAGE_SIZE,
};
pub use error::{FieldError, ValidationErrors};
pub use nutrient::{Nutrient, Nutrients};
pub use photo::{validate_photo, PhotoError, PhotoMeta};
pub use policy::{Actor, AllergenScope, Permission};
