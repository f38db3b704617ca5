use super::SchemaId;

use std::fmt;

/// Identifies a statement spec (including nested sub-queries).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatementId(Box<str>);

/// Describes one statement execution: which schema maps each expected
/// result set, the declared secondary result-set names, and whether rows
/// for one logical parent are guaranteed contiguous.
#[derive(Debug, Clone)]
pub struct StatementSpec {
    pub id: StatementId,
    schemas: Vec<SchemaId>,
    result_sets: Vec<String>,
    ordered: bool,
}

impl StatementSpec {
    pub fn new(id: impl Into<StatementId>) -> StatementSpec {
        StatementSpec {
            id: id.into(),
            schemas: vec![],
            result_sets: vec![],
            ordered: false,
        }
    }

    /// Appends a schema mapping the next result set, in position order.
    pub fn schema(mut self, schema: impl Into<SchemaId>) -> Self {
        self.schemas.push(schema.into());
        self
    }

    /// Declares the next secondary result set by name, in position order.
    pub fn result_set(mut self, name: impl Into<String>) -> Self {
        self.result_sets.push(name.into());
        self
    }

    /// Declares that rows for the same logical parent arrive contiguously,
    /// enabling the memory-bounded streaming mode.
    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub fn schemas(&self) -> &[SchemaId] {
        &self.schemas
    }

    pub fn result_sets(&self) -> &[String] {
        &self.result_sets
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }
}

impl StatementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatementId {
    fn from(src: &str) -> StatementId {
        StatementId(src.into())
    }
}

impl From<String> for StatementId {
    fn from(src: String) -> StatementId {
        StatementId(src.into())
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

impl fmt::Debug for StatementId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "StatementId({})", self.0)
    }
}
