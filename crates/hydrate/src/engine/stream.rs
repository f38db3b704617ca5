use super::Exec;
use crate::{ConsumeContext, RowConsumer};

use hydrate_core::key::RowKey;
use hydrate_core::schema::{MappingSchema, PropertyMapping, StatementId};
use hydrate_core::{bail, Result, ResultSetMove, RowSource, RowWindow, Value};

impl<'a, S: RowSource> Exec<'a, S> {
    /// Drives every result set of the statement: the mapped sets first, one
    /// per declared schema in order, then each declared secondary set in
    /// linking mode.
    pub(super) fn run(
        &mut self,
        statement: &StatementId,
        window: RowWindow,
        consumer: &mut dyn RowConsumer,
        custom_consumer: bool,
    ) -> Result<()> {
        let spec = self.catalog().statement(statement)?;
        if spec.schemas().is_empty() {
            bail!("no mapping schema found for statement `{statement}`");
        }
        log::debug!("materializing statement `{statement}`");

        // The source starts positioned on its first result set.
        let mut has_result_set = true;
        for schema_id in spec.schemas() {
            if !has_result_set {
                break;
            }
            let schema = self.catalog().schema(schema_id)?;
            self.handle_result_set(
                schema,
                window,
                consumer,
                custom_consumer,
                None,
                spec.is_ordered(),
            )?;
            self.nested_results.clear();
            has_result_set = self.next_result_set()?;
        }

        for name in spec.result_sets() {
            if !has_result_set {
                break;
            }
            if let Some(mapping) = self.next_result_schemas.get(name).cloned() {
                if let Some(schema_id) = &mapping.nested_schema {
                    let schema = self.catalog().schema(schema_id)?;
                    self.handle_result_set(
                        schema,
                        RowWindow::DEFAULT,
                        consumer,
                        custom_consumer,
                        Some(&mapping),
                        spec.is_ordered(),
                    )?;
                }
            }
            self.nested_results.clear();
            has_result_set = self.next_result_set()?;
        }

        Ok(())
    }

    /// Tolerant advance: some drivers report spurious "nothing here yet"
    /// transitions before the real next result set.
    fn next_result_set(&mut self) -> Result<bool> {
        loop {
            match self.source.advance_result_set()? {
                ResultSetMove::ResultSet => {
                    log::debug!("advanced to next result set");
                    return Ok(true);
                }
                ResultSetMove::Pending => continue,
                ResultSetMove::Done => return Ok(false),
            }
        }
    }

    fn handle_result_set(
        &mut self,
        schema: &'a MappingSchema,
        window: RowWindow,
        consumer: &mut dyn RowConsumer,
        custom_consumer: bool,
        parent: Option<&PropertyMapping>,
        ordered: bool,
    ) -> Result<()> {
        if schema.has_nested() {
            if !window.is_default() && !self.engine.config.allow_row_window_on_nested {
                bail!(
                    "a row window cannot be applied to schema `{}` because it has \
                     nested mappings",
                    schema.id
                );
            }
            if custom_consumer
                && parent.is_none()
                && !ordered
                && !self.engine.config.allow_consumer_on_unordered_nested
            {
                bail!(
                    "a caller-supplied consumer over nested schema `{}` requires \
                     the statement to be declared ordered",
                    schema.id
                );
            }
            self.handle_nested_rows(schema, window, consumer, parent, ordered)
        } else {
            self.handle_simple_rows(schema, window, consumer, parent)
        }
    }

    fn handle_simple_rows(
        &mut self,
        schema: &'a MappingSchema,
        window: RowWindow,
        consumer: &mut dyn RowConsumer,
        parent: Option<&PropertyMapping>,
    ) -> Result<()> {
        let mut cx = ConsumeContext::new();
        self.skip_rows(window.offset)?;
        while self.should_process(&cx, window) && self.source.advance()? {
            let schema = self.resolve_discriminator(schema, "")?;
            let value = self.materialize_simple(schema, "")?;
            self.store(value, parent, consumer, &mut cx)?;
        }
        Ok(())
    }

    fn handle_nested_rows(
        &mut self,
        schema: &'a MappingSchema,
        window: RowWindow,
        consumer: &mut dyn RowConsumer,
        parent: Option<&PropertyMapping>,
        ordered: bool,
    ) -> Result<()> {
        let mut cx = ConsumeContext::new();
        self.skip_rows(window.offset)?;
        let mut row_value = self.previous_row.take().unwrap_or(Value::Null);

        while self.should_process(&cx, window) && self.source.advance()? {
            let schema = self.resolve_discriminator(schema, "")?;
            let key = self.create_row_key(schema, "")?;
            let partial = self.partial_for(&key);
            if ordered {
                // A fresh identity on an ordered stream means the previous
                // parent subgraph is complete: flush it and bound memory by
                // dropping the cache.
                if partial.is_none() && !row_value.is_null() {
                    self.nested_results.clear();
                    self.store(row_value.take(), parent, consumer, &mut cx)?;
                }
                row_value = self.materialize_nested(schema, &key, "", partial)?;
            } else {
                row_value = self.materialize_nested(schema, &key, "", partial.clone())?;
                if partial.is_none() {
                    self.store(row_value.clone(), parent, consumer, &mut cx)?;
                }
            }
        }

        if !row_value.is_null() && ordered && self.should_process(&cx, window) {
            self.store(row_value, parent, consumer, &mut cx)?;
            self.previous_row = None;
        } else if !row_value.is_null() {
            self.previous_row = Some(row_value);
        }
        Ok(())
    }

    /// Hands a produced value off: to the linking table when this is a
    /// secondary result set, to the consumer otherwise.
    fn store(
        &mut self,
        value: Value,
        parent: Option<&PropertyMapping>,
        consumer: &mut dyn RowConsumer,
        cx: &mut ConsumeContext,
    ) -> Result<()> {
        match parent {
            Some(mapping) => self.link_to_parents(mapping, value),
            None => {
                cx.record();
                consumer.consume(value, &self.graph, cx)
            }
        }
    }

    fn skip_rows(&mut self, offset: usize) -> Result<()> {
        for _ in 0..offset {
            if !self.source.advance()? {
                break;
            }
        }
        Ok(())
    }

    fn should_process(&self, cx: &ConsumeContext, window: RowWindow) -> bool {
        !cx.is_stopped() && cx.count() < window.limit
    }

    /// Advances the underlying cursor one row. Used by the streaming cursor.
    pub(crate) fn advance_row(&mut self) -> Result<bool> {
        self.source.advance()
    }

    pub(crate) fn clear_nested_results(&mut self) {
        self.nested_results.clear();
    }

    /// Cached partial object for a combined key, if one exists.
    pub(crate) fn partial_for(&self, key: &RowKey) -> Option<Value> {
        key.as_key()
            .and_then(|key| self.nested_results.get(key))
            .filter(|value| !value.is_null())
            .cloned()
    }
}
