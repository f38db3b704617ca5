mod acquire;
mod bind;
mod discriminator;
mod instantiate;
mod loader;
mod nested;
mod relations;
mod row_key;
mod stream;

use crate::{Collector, Config, ResultBatch, ResultCursor, RowConsumer};

use hydrate_core::convert::{ConverterRegistry, DefaultConverters};
use hydrate_core::exec::{NoExecutor, QueryExecutor};
use hydrate_core::factory::{DefaultFactory, ObjectFactory};
use hydrate_core::key::IdentityKey;
use hydrate_core::row::SourceType;
use hydrate_core::schema::{Catalog, PropertyMapping, SchemaId, StatementId};
use hydrate_core::{bail, ObjectGraph, ObjectId, Result, RowSource, RowWindow, Value};

use bind::{AutoMapping, ColumnSplit};
use relations::{LinkKey, PendingRelation};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The result materialization engine.
///
/// Holds the mapping catalog, the configuration, and the collaborator
/// implementations. One engine serves any number of statement executions;
/// all per-statement state lives in an [`Exec`] created per run.
#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    config: Config,
    converters: Box<dyn ConverterRegistry>,
    factory: Box<dyn ObjectFactory>,
    executor: Box<dyn QueryExecutor>,

    // Shared across executions, keyed by (schema id, column prefix). The
    // computed value is deterministic per key, so a racing duplicate
    // computation is benign.
    splits: RwLock<HashMap<(SchemaId, String), Arc<ColumnSplit>>>,
    automaps: RwLock<HashMap<(SchemaId, String), Arc<[AutoMapping]>>>,
}

impl Engine {
    pub fn new(catalog: Catalog) -> Engine {
        Engine {
            catalog,
            config: Config::default(),
            converters: Box::new(DefaultConverters),
            factory: Box::new(DefaultFactory),
            executor: Box::new(NoExecutor),
            splits: RwLock::new(HashMap::new()),
            automaps: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn converters(mut self, converters: impl ConverterRegistry) -> Self {
        self.converters = Box::new(converters);
        self
    }

    pub fn factory(mut self, factory: impl ObjectFactory) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn executor(mut self, executor: impl QueryExecutor) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Materializes every result set of the statement, collecting the
    /// produced values into a batch.
    pub fn execute<S: RowSource>(
        &self,
        statement: &StatementId,
        source: S,
    ) -> Result<ResultBatch> {
        let mut collector = Collector::new();
        let mut exec = Exec::new(self, source);
        let outcome = exec.run(statement, RowWindow::DEFAULT, &mut collector, false);
        let graph = exec.finish(outcome)?;
        Ok(ResultBatch {
            graph,
            rows: collector.into_rows(),
        })
    }

    /// Materializes the statement, handing each produced value to the
    /// caller's consumer. Returns the object graph the handed-off values
    /// point into.
    pub fn execute_with<S: RowSource>(
        &self,
        statement: &StatementId,
        source: S,
        window: RowWindow,
        consumer: &mut dyn RowConsumer,
    ) -> Result<ObjectGraph> {
        let mut exec = Exec::new(self, source);
        let outcome = exec.run(statement, window, consumer, true);
        exec.finish(outcome)
    }

    /// Opens a one-shot streaming cursor over the statement's single result
    /// set. Nested mappings require the statement to be declared ordered.
    pub fn cursor<S: RowSource>(
        &self,
        statement: &StatementId,
        source: S,
    ) -> Result<ResultCursor<'_, S>> {
        let spec = self.catalog.statement(statement)?;
        if spec.schemas().len() != 1 || !spec.result_sets().is_empty() {
            bail!(
                "cursor execution supports a single mapped result set; \
                 statement `{statement}` maps {}",
                spec.schemas().len() + spec.result_sets().len()
            );
        }
        let schema = self.catalog.schema(&spec.schemas()[0])?;
        if schema.has_nested() && !spec.is_ordered() {
            bail!(
                "cursor execution over nested mappings requires statement \
                 `{statement}` to be declared ordered"
            );
        }
        Ok(ResultCursor::new(
            Exec::new(self, source),
            spec.schemas()[0].clone(),
            schema.has_nested(),
        ))
    }
}

/// Per-statement execution state.
///
/// Owns the row source and the object graph being built; everything else is
/// bookkeeping the row loop threads through the materialization recursion.
pub(crate) struct Exec<'a, S> {
    engine: &'a Engine,
    source: S,
    graph: ObjectGraph,

    /// Materialized-object cache: combined identity key to produced value.
    /// Cleared between result sets and at ordered-mode flush boundaries.
    nested_results: HashMap<IdentityKey, Value>,

    /// Objects on the current row's construction stack, by schema id.
    /// Pushed before nested resolution, popped after.
    ancestors: Vec<(SchemaId, ObjectId)>,

    /// Ordered-mode accumulator carried across result-set boundaries.
    previous_row: Option<Value>,

    /// Parents awaiting values from secondary result sets.
    pending_relations: HashMap<LinkKey, Vec<PendingRelation>>,

    /// Secondary result-set name to the single mapping allowed to claim it.
    next_result_schemas: HashMap<String, PropertyMapping>,
}

impl<'a, S: RowSource> Exec<'a, S> {
    pub(crate) fn new(engine: &'a Engine, source: S) -> Exec<'a, S> {
        Exec {
            engine,
            source,
            graph: ObjectGraph::new(),
            nested_results: HashMap::new(),
            ancestors: vec![],
            previous_row: None,
            pending_relations: HashMap::new(),
            next_result_schemas: HashMap::new(),
        }
    }

    pub(crate) fn catalog(&self) -> &'a Catalog {
        let engine = self.engine;
        &engine.catalog
    }

    pub(crate) fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    /// Releases the source and, on success, yields the object graph.
    pub(crate) fn finish(mut self, outcome: Result<()>) -> Result<ObjectGraph> {
        self.source.close();
        outcome.map(|()| self.graph)
    }

    pub(crate) fn close_source(&mut self) {
        self.source.close();
    }

    /// Reads a column of the current row through the conversion registry.
    fn read(&self, column: &str, declared: Option<SourceType>) -> Result<Value> {
        let natural = self.source.value(column)?;
        self.engine.converters.convert(natural, declared)
    }
}

/// Applies a column prefix; prefixes are stored upper-cased and column
/// matching is case-insensitive throughout.
fn prepend(prefix: &str, column: &str) -> String {
    if prefix.is_empty() {
        column.to_string()
    } else {
        format!("{prefix}{column}")
    }
}

/// The effective prefix for a nested mapping: parent prefix concatenated
/// with the mapping's own, upper-cased.
fn child_prefix(parent: &str, mapping: &PropertyMapping) -> String {
    let mut prefix = String::from(parent);
    if let Some(own) = &mapping.column_prefix {
        prefix.push_str(&own.to_uppercase());
    }
    prefix
}
