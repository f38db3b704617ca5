use super::{acquire::Acquired, prepend, Exec};

use hydrate_core::exec::LoadPlan;
use hydrate_core::schema::PropertyMapping;
use hydrate_core::value::Lazy;
use hydrate_core::{Result, RowSource, Value};

use indexmap::IndexMap;

impl<'a, S: RowSource> Exec<'a, S> {
    /// Acquires the value for a nested sub-query mapping.
    ///
    /// Already-cached and lazy sub-queries both bind a deferred cell that
    /// resolves on first read; everything else executes inline.
    pub(super) fn nested_query_value(
        &mut self,
        mapping: &PropertyMapping,
        prefix: &str,
    ) -> Result<Acquired> {
        let Some(statement) = &mapping.nested_query else {
            return Ok(Acquired::None);
        };
        let Some(param) = self.nested_query_param(mapping, prefix)? else {
            return Ok(Acquired::None);
        };
        let plan = LoadPlan::new(statement.clone(), param, mapping.declared);
        if self.engine.executor.is_cached(&plan.cache_key()) || mapping.lazy {
            return Ok(Acquired::Found(Value::Deferred(Lazy::new(plan))));
        }
        let value = plan.load(&*self.engine.executor)?;
        Ok(if value.is_null() {
            Acquired::None
        } else {
            Acquired::Found(value)
        })
    }

    /// Builds the sub-query's parameter from the current row.
    ///
    /// Simple parameters are one column read; composite parameters collect
    /// every declared (property, column) pair into a map and abort the
    /// sub-query the moment any composite column is null.
    pub(super) fn nested_query_param(
        &self,
        mapping: &PropertyMapping,
        prefix: &str,
    ) -> Result<Option<Value>> {
        if mapping.is_composite() {
            let mut fields = IndexMap::new();
            for composite in &mapping.composites {
                let value = self.source.value(&prepend(prefix, &composite.column))?;
                if value.is_null() {
                    return Ok(None);
                }
                fields.insert(composite.property.clone(), value);
            }
            return Ok(Some(Value::Map(fields)));
        }
        let Some(column) = &mapping.column else {
            return Ok(None);
        };
        let value = self.source.value(&prepend(prefix, column))?;
        Ok((!value.is_null()).then_some(value))
    }
}
