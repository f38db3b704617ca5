use crate::{
    exec::{LoadPlan, QueryExecutor},
    Result, Value,
};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// A lazily loaded value slot.
///
/// Holds the plan for a deferred sub-query; the first `force` executes the
/// plan synchronously and caches the result, after which the cell is
/// resolved forever. Clones share the same cell. Equality and hashing are
/// by cell identity, which keeps unresolved slots usable inside [`Value`]s
/// that serve as map keys.
#[derive(Clone)]
pub struct Lazy {
    inner: Arc<LazyInner>,
}

struct LazyInner {
    plan: LoadPlan,
    cell: OnceLock<Value>,
}

impl Lazy {
    pub fn new(plan: LoadPlan) -> Lazy {
        Lazy {
            inner: Arc::new(LazyInner {
                plan,
                cell: OnceLock::new(),
            }),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.cell.get().is_some()
    }

    /// The resolved value, if `force` has run.
    pub fn get(&self) -> Option<&Value> {
        self.inner.cell.get()
    }

    pub fn plan(&self) -> &LoadPlan {
        &self.inner.plan
    }

    /// Resolves the slot, executing the pending sub-query on first access.
    pub fn force(&self, executor: &dyn QueryExecutor) -> Result<&Value> {
        if let Some(value) = self.inner.cell.get() {
            return Ok(value);
        }
        let value = self.inner.plan.load(executor)?;
        // A racing force computed the same deterministic value; keep the
        // first write.
        Ok(self.inner.cell.get_or_init(|| value))
    }
}

impl PartialEq for Lazy {
    fn eq(&self, other: &Lazy) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Lazy {}

impl Hash for Lazy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.cell.get() {
            Some(value) => fmt.debug_tuple("Lazy").field(value).finish(),
            None => fmt
                .debug_struct("Lazy")
                .field("statement", &self.inner.plan.statement)
                .field("resolved", &false)
                .finish(),
        }
    }
}
