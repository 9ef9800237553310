//! SQL that Diesel's DSL doesn't cover.
//!
//! User input only ever reaches these functions as bound parameters.

use diesel::define_sql_function;
use diesel::sql_types::Text;

define_sql_function! {
    /// `LOWER(text)`. Case-insensitive comparisons go through this so they
    /// match the `LOWER(...)` unique indexes on users and allergens.
    fn lower(x: Text) -> Text;
}
