use hydrate_core::{ObjectGraph, Result, Value};

/// Per-statement consumption state handed to the consumer with every object.
#[derive(Debug, Default)]
pub struct ConsumeContext {
    count: usize,
    stopped: bool,
}

impl ConsumeContext {
    pub(crate) fn new() -> ConsumeContext {
        ConsumeContext::default()
    }

    /// Objects handed off so far, including the current one.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Signals that no further objects should be materialized.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn record(&mut self) {
        self.count += 1;
    }
}

/// Receives materialized objects one at a time.
///
/// The value is `Value::Object` for record and map destinations, a scalar for
/// scalar schemas, or `Value::Null` when empty-row substitution produced
/// nothing bindable. The graph resolves object handles.
pub trait RowConsumer {
    fn consume(&mut self, value: Value, graph: &ObjectGraph, cx: &mut ConsumeContext)
        -> Result<()>;
}

impl<F> RowConsumer for F
where
    F: FnMut(Value, &ObjectGraph, &mut ConsumeContext) -> Result<()>,
{
    fn consume(
        &mut self,
        value: Value,
        graph: &ObjectGraph,
        cx: &mut ConsumeContext,
    ) -> Result<()> {
        self(value, graph, cx)
    }
}

/// Default consumer: collects every object into a batch.
#[derive(Debug, Default)]
pub struct Collector {
    rows: Vec<Value>,
}

impl Collector {
    pub fn new() -> Collector {
        Collector::default()
    }

    pub(crate) fn into_rows(self) -> Vec<Value> {
        self.rows
    }
}

impl RowConsumer for Collector {
    fn consume(
        &mut self,
        value: Value,
        _graph: &ObjectGraph,
        _cx: &mut ConsumeContext,
    ) -> Result<()> {
        self.rows.push(value);
        Ok(())
    }
}

/// Everything one statement execution produced: the materialized values in
/// hand-off order plus the object graph their handles point into.
#[derive(Debug)]
pub struct ResultBatch {
    pub graph: ObjectGraph,
    pub rows: Vec<Value>,
}

static NULL: Value = Value::Null;

impl ResultBatch {
    /// Reads a property of a materialized object.
    pub fn property(&self, value: &Value, name: &str) -> &Value {
        match value.as_object() {
            Some(id) => self.graph.property(id, name),
            None => &NULL,
        }
    }
}
