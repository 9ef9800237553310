use crate::db::DbPool;
use crate::models::{NewSession, User};
use crate::schema::{sessions, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;

use super::crypto::{generate_token, hash_token};

const SESSION_LIFETIME_DAYS: i64 = 30;

/// Open a session for `user_id` and return the bearer token. Only the token's
/// hash is stored.
pub fn create_session(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<String, diesel::result::Error> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);

    let new_session = NewSession {
        user_id,
        token_hash: &token_hash,
        expires_at,
    };

    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    Ok(token)
}

/// Remove the session behind `token`. Returns whether one existed.
pub fn delete_session(conn: &mut PgConnection, token: &str) -> Result<bool, diesel::result::Error> {
    let deleted = diesel::delete(sessions::table.filter(sessions::token_hash.eq(hash_token(token))))
        .execute(conn)?;
    Ok(deleted > 0)
}

pub async fn get_user_from_token(pool: &DbPool, token: &str) -> Option<User> {
    let mut conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to get DB connection for auth: {}", e);
            return None;
        }
    };
    let token_hash = hash_token(token);

    sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(&token_hash))
        .filter(sessions::expires_at.gt(Utc::now()))
        .select(User::as_select())
        .first(&mut conn)
        .ok()
}
