//! Database collaborator exposed to user code.
//!
//! Rows come back as JSON objects. Runtimes without a host database use
//! [`NoopDb`], whose queries always fail with
//! [`ShimError::Unavailable`] so a handler's `?` turns them into a 500.

use serde_json::Value;
use tracing::warn;

use crate::error::{ShimError, ShimResult};

pub trait DbClient {
    fn query(&self, sql: &str) -> ShimResult<Vec<Value>>;
}

/// Stand-in for a missing host database.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDb;

impl DbClient for NoopDb {
    fn query(&self, sql: &str) -> ShimResult<Vec<Value>> {
        warn!(sql_len = sql.len(), "db query is not supported in this runtime");
        Err(ShimError::Unavailable("db query"))
    }
}
