//! User row operations.

use crate::client::{create, fetch, fetch_first, Store};
use crate::error::Result;
use crate::models::{NewUser, User};
use crate::query::Query;
use crate::table::Table;

/// Create a new user. A taken email surfaces as a conflict.
pub async fn create_user(store: &dyn Store, user: &NewUser) -> Result<User> {
    create(store, Table::User, user).await
}

/// Get a user by ID.
pub async fn get_user(store: &dyn Store, user_id: &str) -> Result<Option<User>> {
    fetch_first(store, Table::User, &Query::new().eq("user_id", user_id)).await
}

/// Get a user by (already case-folded) email.
pub async fn get_user_by_email(store: &dyn Store, email: &str) -> Result<Option<User>> {
    fetch_first(store, Table::User, &Query::new().eq("user_email", email)).await
}

/// Get every user whose ID is in `user_ids`.
pub async fn get_users(store: &dyn Store, user_ids: &[String]) -> Result<Vec<User>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    fetch(store, Table::User, &Query::new().within("user_id", user_ids)).await
}
