use crate::{row::SourceType, schema::StatementId, Result, Value};

use std::fmt::Debug;

/// Cache identity of one sub-query execution: statement plus parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub statement: StatementId,
    pub param: Value,
}

impl CacheKey {
    pub fn new(statement: StatementId, param: Value) -> CacheKey {
        CacheKey { statement, param }
    }
}

/// Everything needed to run one deferred sub-query later.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    pub statement: StatementId,
    pub param: Value,
    pub declared: Option<SourceType>,
}

impl LoadPlan {
    pub fn new(statement: StatementId, param: Value, declared: Option<SourceType>) -> LoadPlan {
        LoadPlan {
            statement,
            param,
            declared,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.statement.clone(), self.param.clone())
    }

    pub fn load(&self, executor: &dyn QueryExecutor) -> Result<Value> {
        executor.execute(&self.statement, &self.param)
    }
}

/// Sub-query execution collaborator.
///
/// The engine uses it for nested sub-query mappings: eagerly, or through a
/// [`crate::value::Lazy`] cell resolved on first access.
pub trait QueryExecutor: Debug + Send + Sync + 'static {
    /// Whether this execution's result is already cached; cached sub-queries
    /// are deferred rather than re-executed inline.
    fn is_cached(&self, _key: &CacheKey) -> bool {
        false
    }

    fn execute(&self, statement: &StatementId, param: &Value) -> Result<Value>;
}

/// Placeholder executor for engines that never run sub-queries.
#[derive(Debug, Default)]
pub struct NoExecutor;

impl QueryExecutor for NoExecutor {
    fn execute(&self, statement: &StatementId, _param: &Value) -> Result<Value> {
        crate::bail!("no sub-query executor configured; statement `{statement}` cannot run")
    }
}
