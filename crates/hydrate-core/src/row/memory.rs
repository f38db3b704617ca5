use super::{ColumnInfo, ResultSetMove, RowSource, SourceType};
use crate::{bail, Result, Value};

/// In-memory rows for one result set.
///
/// Ships with the crate for tests and embedding; plays the role a database
/// driver's row loop plays in production use.
#[derive(Debug, Default)]
pub struct MemoryRows {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
    cursor: Option<usize>,
    closed: bool,
}

impl MemoryRows {
    pub fn new<'a>(columns: impl IntoIterator<Item = (&'a str, SourceType)>) -> MemoryRows {
        MemoryRows {
            columns: columns
                .into_iter()
                .map(|(name, source)| ColumnInfo::new(name, source))
                .collect(),
            rows: vec![],
            cursor: None,
            closed: false,
        }
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        assert_eq!(
            values.len(),
            self.columns.len(),
            "row width must match declared columns"
        );
        self.rows.push(values);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(column))
    }

    fn current(&self) -> Option<&Vec<Value>> {
        self.cursor.and_then(|i| self.rows.get(i))
    }
}

impl RowSource for MemoryRows {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn advance(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        let next = self.cursor.map(|i| i + 1).unwrap_or(0);
        self.cursor = Some(next);
        Ok(next < self.rows.len())
    }

    fn value(&self, column: &str) -> Result<Value> {
        let Some(index) = self.column_index(column) else {
            bail!("unknown column `{column}` in result set");
        };
        Ok(self
            .current()
            .and_then(|row| row.get(index))
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn source_type(&self, column: &str) -> Option<SourceType> {
        self.column_index(column).map(|i| self.columns[i].source)
    }

    fn advance_result_set(&mut self) -> Result<ResultSetMove> {
        self.closed = true;
        Ok(ResultSetMove::Done)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// A sequence of in-memory result sets, as produced by a multi-cursor
/// statement.
///
/// Spurious transitions can be interleaved to exercise the tolerant advance
/// loop drivers require.
#[derive(Debug, Default)]
pub struct MemoryResultSets {
    sets: Vec<Entry>,
    index: usize,
    close_count: usize,
    empty: Vec<ColumnInfo>,
}

#[derive(Debug)]
enum Entry {
    Rows(MemoryRows),
    Spurious,
}

impl MemoryResultSets {
    pub fn new() -> MemoryResultSets {
        MemoryResultSets::default()
    }

    pub fn result_set(mut self, rows: MemoryRows) -> Self {
        self.sets.push(Entry::Rows(rows));
        self
    }

    /// Inserts a spurious "no result set" transition before the next result
    /// set.
    pub fn spurious(mut self) -> Self {
        self.sets.push(Entry::Spurious);
        self
    }

    /// How many times `close` has been invoked.
    pub fn close_count(&self) -> usize {
        self.close_count
    }

    /// True once every contained result set has been released.
    pub fn all_released(&self) -> bool {
        self.sets.iter().all(|entry| match entry {
            Entry::Rows(rows) => rows.is_closed(),
            Entry::Spurious => true,
        })
    }

    fn current(&self) -> Option<&MemoryRows> {
        match self.sets.get(self.index) {
            Some(Entry::Rows(rows)) => Some(rows),
            _ => None,
        }
    }

    fn current_mut(&mut self) -> Option<&mut MemoryRows> {
        match self.sets.get_mut(self.index) {
            Some(Entry::Rows(rows)) => Some(rows),
            _ => None,
        }
    }
}

impl RowSource for MemoryResultSets {
    fn columns(&self) -> &[ColumnInfo] {
        self.current()
            .map(|rows| rows.columns())
            .unwrap_or(&self.empty)
    }

    fn advance(&mut self) -> Result<bool> {
        match self.current_mut() {
            Some(rows) => rows.advance(),
            None => Ok(false),
        }
    }

    fn value(&self, column: &str) -> Result<Value> {
        match self.current() {
            Some(rows) => rows.value(column),
            None => bail!("no current result set"),
        }
    }

    fn source_type(&self, column: &str) -> Option<SourceType> {
        self.current().and_then(|rows| rows.source_type(column))
    }

    fn advance_result_set(&mut self) -> Result<ResultSetMove> {
        if let Some(rows) = self.current_mut() {
            rows.close();
        }
        if self.index >= self.sets.len() {
            return Ok(ResultSetMove::Done);
        }
        self.index += 1;
        match self.sets.get(self.index) {
            Some(Entry::Rows(_)) => Ok(ResultSetMove::ResultSet),
            Some(Entry::Spurious) => Ok(ResultSetMove::Pending),
            None => Ok(ResultSetMove::Done),
        }
    }

    fn close(&mut self) {
        self.close_count += 1;
        for entry in &mut self.sets {
            if let Entry::Rows(rows) = entry {
                rows.close();
            }
        }
    }
}
