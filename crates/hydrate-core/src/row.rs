mod memory;
pub use memory::{MemoryResultSets, MemoryRows};

use crate::{Result, Value};

/// Declared type of a column or destination slot.
///
/// Used on both sides of a conversion: row sources report one per column,
/// and type descriptors declare one per property or constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    Bool,
    Bytes,
    F64,
    I32,
    I64,
    String,
    /// A nested object slot
    Object,
    /// A collection slot
    List,
    /// No declared type; conversions fall back to the natural value
    Unknown,
}

/// Per-column metadata reported by a row source.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub source: SourceType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, source: SourceType) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            source,
        }
    }
}

/// Offset/limit window applied to one result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub offset: usize,
    pub limit: usize,
}

impl RowWindow {
    pub const DEFAULT: RowWindow = RowWindow {
        offset: 0,
        limit: usize::MAX,
    };

    pub fn new(offset: usize, limit: usize) -> RowWindow {
        RowWindow { offset, limit }
    }

    pub fn is_default(&self) -> bool {
        *self == RowWindow::DEFAULT
    }
}

impl Default for RowWindow {
    fn default() -> RowWindow {
        RowWindow::DEFAULT
    }
}

/// Outcome of asking a row source for its next result set.
///
/// `Pending` models drivers that report a spurious "no result set here"
/// transition before the real one; callers keep advancing until they see a
/// genuine `ResultSet` or `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSetMove {
    /// Positioned on a new result set, before its first row.
    ResultSet,
    /// Nothing here, but the source has not reached a terminal state.
    Pending,
    /// No further result sets.
    Done,
}

/// A forward-only tabular cursor over one or more result sets.
///
/// A source starts positioned on its first result set, before the first row.
/// Column names are matched case-insensitively. Advancing to the next result
/// set releases the previous one; [`RowSource::close`] releases whatever
/// remains and must be tolerated more than once.
pub trait RowSource {
    /// Column metadata for the current result set.
    fn columns(&self) -> &[ColumnInfo];

    /// Advances to the next row. Returns `false` once the current result set
    /// is exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Reads a column of the current row by name. Unknown columns are an
    /// error; absent values are `Value::Null`.
    fn value(&self, column: &str) -> Result<Value>;

    /// Declared source type of a column, if the column exists.
    fn source_type(&self, column: &str) -> Option<SourceType>;

    /// Moves to the next result set, releasing the current one.
    fn advance_result_set(&mut self) -> Result<ResultSetMove>;

    /// Releases all remaining cursor resources.
    fn close(&mut self);
}

impl<T: RowSource + ?Sized> RowSource for &mut T {
    fn columns(&self) -> &[ColumnInfo] {
        (**self).columns()
    }

    fn advance(&mut self) -> Result<bool> {
        (**self).advance()
    }

    fn value(&self, column: &str) -> Result<Value> {
        (**self).value(column)
    }

    fn source_type(&self, column: &str) -> Option<SourceType> {
        (**self).source_type(column)
    }

    fn advance_result_set(&mut self) -> Result<ResultSetMove> {
        (**self).advance_result_set()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
