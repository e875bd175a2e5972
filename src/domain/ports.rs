use crate::core::query::Query;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A read-only document store that can evaluate a structured [`Query`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Runs the query and returns the raw result payload: an array for
    /// listing and pluck queries, an object or `null` for `[0]` lookups.
    async fn execute(&self, query: &Query) -> Result<serde_json::Value>;

    /// Short name used in log lines.
    fn name(&self) -> &str;
}
