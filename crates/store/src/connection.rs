//! Connection row operations.

use crate::client::{create, fetch, Store};
use crate::error::Result;
use crate::models::Connection;
use crate::query::Query;
use crate::table::Table;

/// Create a connection. A duplicate pair surfaces as a conflict.
pub async fn create_connection(store: &dyn Store, user1_id: &str, user2_id: &str) -> Result<Connection> {
    let row = Connection {
        connection_id: None,
        user1_id: user1_id.to_string(),
        user2_id: user2_id.to_string(),
    };
    create(store, Table::Connection, &row).await
}

/// All connections where `user_id` is on either side.
pub async fn list_for_user(store: &dyn Store, user_id: &str) -> Result<Vec<Connection>> {
    let query = Query::new().any_eq([("user1_id", user_id), ("user2_id", user_id)]);
    fetch(store, Table::Connection, &query).await
}
