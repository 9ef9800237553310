//! Allergen queries shared by the allergen and dish endpoints.

use crate::error::ApiError;
use crate::models::{Allergen, NewAllergen};
use crate::raw_sql::lower;
use crate::schema::allergens;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use platebook_core::validation::duplicate_allergen_name;
use platebook_core::AllergenScope;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllergenItem {
    pub id: i64,
    pub name: String,
    pub is_global: bool,
}

impl From<Allergen> for AllergenItem {
    fn from(a: Allergen) -> Self {
        AllergenItem {
            id: a.id,
            name: a.name,
            is_global: a.is_global,
        }
    }
}

/// Global allergens plus `user_id`'s personal ones, by name.
pub fn load_available(conn: &mut PgConnection, user_id: i64) -> QueryResult<Vec<Allergen>> {
    allergens::table
        .filter(
            allergens::is_global
                .eq(true)
                .or(allergens::created_by.eq(user_id)),
        )
        .order((lower(allergens::name).asc(), allergens::id.asc()))
        .select(Allergen::as_select())
        .load(conn)
}

pub fn find(conn: &mut PgConnection, id: i64) -> QueryResult<Option<Allergen>> {
    allergens::table
        .find(id)
        .select(Allergen::as_select())
        .first(conn)
        .optional()
}

/// Whether `name` (case-insensitive) is already used in `scope`, ignoring
/// the allergen `except`.
fn name_taken(
    conn: &mut PgConnection,
    scope: AllergenScope,
    name: &str,
    except: Option<i64>,
) -> QueryResult<bool> {
    let mut query = allergens::table
        .filter(lower(allergens::name).eq(lower(name)))
        .select(allergens::id)
        .into_boxed();

    query = match scope {
        AllergenScope::Global => query.filter(allergens::is_global.eq(true)),
        AllergenScope::Personal { owner: Some(owner) } => query
            .filter(allergens::is_global.eq(false))
            .filter(allergens::created_by.eq(owner)),
        AllergenScope::Personal { owner: None } => query
            .filter(allergens::is_global.eq(false))
            .filter(allergens::created_by.is_null()),
    };

    if let Some(id) = except {
        query = query.filter(allergens::id.ne(id));
    }

    Ok(query.first::<i64>(conn).optional()?.is_some())
}

fn map_unique_violation(e: DieselError, scope: AllergenScope) -> ApiError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            duplicate_allergen_name(scope).into()
        }
        other => other.into(),
    }
}

/// Insert an allergen named `name` into `scope`. Duplicates, including ones
/// that lose a race against the unique index, come back as a validation error.
pub fn insert(
    conn: &mut PgConnection,
    scope: AllergenScope,
    name: &str,
) -> Result<Allergen, ApiError> {
    if name_taken(conn, scope, name, None)? {
        return Err(duplicate_allergen_name(scope).into());
    }

    let created_by = match scope {
        AllergenScope::Global => None,
        AllergenScope::Personal { owner } => owner,
    };

    diesel::insert_into(allergens::table)
        .values(NewAllergen {
            name,
            is_global: scope.is_global(),
            created_by,
        })
        .returning(Allergen::as_returning())
        .get_result(conn)
        .map_err(|e| map_unique_violation(e, scope))
}

pub fn rename(conn: &mut PgConnection, allergen: &Allergen, name: &str) -> Result<Allergen, ApiError> {
    let scope = allergen.scope();
    if name_taken(conn, scope, name, Some(allergen.id))? {
        return Err(duplicate_allergen_name(scope).into());
    }

    diesel::update(allergens::table.find(allergen.id))
        .set(allergens::name.eq(name))
        .returning(Allergen::as_returning())
        .get_result(conn)
        .map_err(|e| map_unique_violation(e, scope))
}
