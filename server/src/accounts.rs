//! Uniqueness checks shared by registration and the staff user forms.

use crate::error::ApiError;
use crate::raw_sql::lower;
use crate::schema::users;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use platebook_core::ValidationErrors;

const EMAIL_TAKEN: &str = "A user with that email already exists.";
const LOGIN_TAKEN: &str = "A user with that username already exists.";

/// Report `email` and `login` clashes (case-insensitive) with users other
/// than `except`. `login_field` names the form field the login came from.
pub fn check_identity_available(
    conn: &mut PgConnection,
    email: &str,
    login: &str,
    login_field: &str,
    except: Option<i64>,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrors::new();

    let mut email_query = users::table
        .filter(lower(users::email).eq(lower(email)))
        .select(users::id)
        .into_boxed();
    if let Some(id) = except {
        email_query = email_query.filter(users::id.ne(id));
    }
    if email_query.first::<i64>(conn).optional()?.is_some() {
        errors.push_field("email", EMAIL_TAKEN);
    }

    let mut login_query = users::table
        .filter(lower(users::login).eq(lower(login)))
        .select(users::id)
        .into_boxed();
    if let Some(id) = except {
        login_query = login_query.filter(users::id.ne(id));
    }
    if login_query.first::<i64>(conn).optional()?.is_some() {
        errors.push_field(login_field, LOGIN_TAKEN);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

/// A concurrent insert can slip past [`check_identity_available`]; the unique
/// index then fails the write and the caller gets the same field error.
pub fn map_unique_violation(e: DieselError, login_field: &str) -> ApiError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
            if info.constraint_name() == Some("users_email_key") {
                ValidationErrors::field("email", EMAIL_TAKEN).into()
            } else {
                ValidationErrors::field(login_field, LOGIN_TAKEN).into()
            }
        }
        other => other.into(),
    }
}
