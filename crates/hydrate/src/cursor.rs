use crate::engine::Exec;

use hydrate_core::schema::SchemaId;
use hydrate_core::{err, ObjectGraph, Result, RowSource, Value};

/// One-shot streaming cursor of materialized values.
///
/// Backed directly by the row source: forward-only, not restartable, and
/// iterable exactly once. Flat schemas stream row by row; nested schemas
/// stream one parent subgraph at a time, which is why they must be declared
/// ordered.
pub struct ResultCursor<'a, S: RowSource> {
    exec: Exec<'a, S>,
    schema: SchemaId,
    nested: bool,
    state: State,
    /// Nested mode: the parent accumulated so far, flushed on key boundary.
    pending: Value,
}

impl<S: RowSource> std::fmt::Debug for ResultCursor<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCursor")
            .field("schema", &self.schema)
            .field("nested", &self.nested)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Scanning,
    Exhausted,
    Closed,
}

/// The cursor's single pass, yielding one materialized value per call.
pub struct Objects<'c, 'a, S: RowSource> {
    cursor: &'c mut ResultCursor<'a, S>,
}

impl<S: RowSource> std::fmt::Debug for Objects<'_, '_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Objects").field("cursor", &self.cursor).finish()
    }
}

impl<'a, S: RowSource> ResultCursor<'a, S> {
    pub(crate) fn new(exec: Exec<'a, S>, schema: SchemaId, nested: bool) -> ResultCursor<'a, S> {
        ResultCursor {
            exec,
            schema,
            nested,
            state: State::Fresh,
            pending: Value::Null,
        }
    }

    /// Begins the single iteration pass. A second call is an error.
    pub fn objects(&mut self) -> Result<Objects<'_, 'a, S>> {
        match self.state {
            State::Fresh => {
                self.state = State::Scanning;
                Ok(Objects { cursor: self })
            }
            State::Closed => Err(err!("cursor is closed")),
            _ => Err(err!("cursor can only be iterated once")),
        }
    }

    /// The object graph built so far; handles in yielded values point here.
    pub fn graph(&self) -> &ObjectGraph {
        self.exec.graph()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    /// Releases the underlying source. Called automatically on exhaustion
    /// and on drop.
    pub fn close(&mut self) {
        self.state = State::Closed;
        self.exec.close_source();
    }

    fn step(&mut self) -> Result<Option<Value>> {
        if matches!(self.state, State::Exhausted | State::Closed) {
            return Ok(None);
        }
        if self.nested {
            self.step_nested()
        } else {
            self.step_flat()
        }
    }

    fn step_flat(&mut self) -> Result<Option<Value>> {
        if !self.exec.advance_row()? {
            self.finish_scan();
            return Ok(None);
        }
        let schema = self.exec.catalog().schema(&self.schema)?;
        let schema = self.exec.resolve_discriminator(schema, "")?;
        let value = self.exec.materialize_simple(schema, "")?;
        Ok(Some(value))
    }

    /// Accumulates rows into the pending parent until its identity key no
    /// longer matches, then yields it.
    fn step_nested(&mut self) -> Result<Option<Value>> {
        loop {
            if !self.exec.advance_row()? {
                self.finish_scan();
                let last = self.pending.take();
                return Ok((!last.is_null()).then_some(last));
            }
            let schema = self.exec.catalog().schema(&self.schema)?;
            let schema = self.exec.resolve_discriminator(schema, "")?;
            let key = self.exec.create_row_key(schema, "")?;
            let partial = self.exec.partial_for(&key);

            let flush = partial.is_none() && !self.pending.is_null();
            if flush {
                self.exec.clear_nested_results();
            }
            let value = self.exec.materialize_nested(schema, &key, "", partial)?;
            if flush {
                let previous = std::mem::replace(&mut self.pending, value);
                return Ok(Some(previous));
            }
            self.pending = value;
        }
    }

    fn finish_scan(&mut self) {
        self.state = State::Exhausted;
        self.exec.close_source();
    }
}

impl<'a, S: RowSource> Drop for ResultCursor<'a, S> {
    fn drop(&mut self) {
        self.exec.close_source();
    }
}

impl<S: RowSource> Iterator for Objects<'_, '_, S> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Result<Value>> {
        match self.cursor.step() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => None,
            Err(err) => {
                self.cursor.finish_scan();
                Some(Err(err))
            }
        }
    }
}
