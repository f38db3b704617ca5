use super::{child_prefix, instantiate::Created, prepend, Exec};

use hydrate_core::key::RowKey;
use hydrate_core::schema::{MappingSchema, PropertyMapping};
use hydrate_core::{ObjectId, Result, RowSource, Value};

impl<'a, S: RowSource> Exec<'a, S> {
    /// Materializes one flat row: instantiate, bind, done. Also used for
    /// nested-schema constructor arguments.
    pub(crate) fn materialize_simple(
        &mut self,
        schema: &'a MappingSchema,
        prefix: &str,
    ) -> Result<Value> {
        match self.create_result_object(schema, prefix)? {
            Created::None => Ok(Value::Null),
            Created::Scalar(value) => Ok(value),
            Created::Object {
                id,
                constructor_built,
            } => {
                let mut found = constructor_built;
                if self.should_auto_map(schema, false) {
                    found |= self.apply_automatic_mappings(schema, id, prefix)?;
                }
                found |= self.apply_property_mappings(schema, id, prefix)?;
                if found || self.engine.config.instance_for_empty_row {
                    Ok(Value::Object(id))
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    /// The recursive entry point for nested rows.
    ///
    /// A supplied partial object means a prior row already began this
    /// logical entity; it is re-run through nested resolution to pick up the
    /// current row's joined columns. A new object is cached under the
    /// combined key so later rows and deeper recursion find it, unless the
    /// key is degenerate.
    pub(crate) fn materialize_nested(
        &mut self,
        schema: &'a MappingSchema,
        combined: &RowKey,
        prefix: &str,
        partial: Option<Value>,
    ) -> Result<Value> {
        if let Some(value) = partial {
            if let Some(id) = value.as_object() {
                self.ancestors.push((schema.id.clone(), id));
                self.apply_nested_mappings(schema, id, prefix, combined, false)?;
                self.ancestors.pop();
            }
            return Ok(value);
        }

        let value = match self.create_result_object(schema, prefix)? {
            Created::None => Value::Null,
            Created::Scalar(value) => value,
            Created::Object {
                id,
                constructor_built,
            } => {
                let mut found = constructor_built;
                if self.should_auto_map(schema, true) {
                    found |= self.apply_automatic_mappings(schema, id, prefix)?;
                }
                found |= self.apply_property_mappings(schema, id, prefix)?;
                self.ancestors.push((schema.id.clone(), id));
                found |= self.apply_nested_mappings(schema, id, prefix, combined, true)?;
                self.ancestors.pop();
                if found || self.engine.config.instance_for_empty_row {
                    Value::Object(id)
                } else {
                    Value::Null
                }
            }
        };
        if let Some(key) = combined.as_key() {
            self.nested_results.insert(key.clone(), value.clone());
        }
        Ok(value)
    }

    /// Recurses into every joined mapping of the schema.
    fn apply_nested_mappings(
        &mut self,
        schema: &'a MappingSchema,
        holder: ObjectId,
        parent_prefix: &str,
        parent_key: &RowKey,
        new_object: bool,
    ) -> Result<bool> {
        let mut found = false;
        for mapping in schema.property_mappings() {
            let (Some(nested_id), None) = (&mapping.nested_schema, &mapping.result_set) else {
                continue;
            };
            let prefix = child_prefix(parent_prefix, mapping);
            let nested = self.resolve_discriminator(self.catalog().schema(nested_id)?, &prefix)?;

            // Circular references resolve against the construction stack,
            // but only when the mapping carries no explicit prefix of its
            // own and only while materializing a newly created parent.
            // Binding during a merge pass would duplicate collection
            // entries.
            if mapping.column_prefix.is_none() {
                if let Some(ancestor) = self.ancestor_for(&nested.id) {
                    if new_object {
                        self.link_objects(holder, mapping, Value::Object(ancestor))?;
                    }
                    continue;
                }
            }

            let key = self.create_row_key(nested, &prefix)?;
            let combined = key.combine(parent_key);
            let partial = self.partial_for(&combined);
            let known = partial.is_some();
            // Collection slots exist even when the gate fails for every row.
            self.instantiate_collection(holder, mapping)?;
            if self.not_null_gate_passes(mapping, &prefix)? {
                let value = self.materialize_nested(nested, &combined, &prefix, partial)?;
                if !value.is_null() && !known {
                    self.link_objects(holder, mapping, value)?;
                    found = true;
                }
            }
        }
        Ok(found)
    }

    fn ancestor_for(&self, schema: &hydrate_core::schema::SchemaId) -> Option<ObjectId> {
        self.ancestors
            .iter()
            .rev()
            .find(|(id, _)| id == schema)
            .map(|(_, object)| *object)
    }

    /// Declared gate columns require at least one non-null; an active prefix
    /// without declared columns requires at least one prefixed column in the
    /// result set; otherwise the gate passes.
    fn not_null_gate_passes(&self, mapping: &PropertyMapping, prefix: &str) -> Result<bool> {
        if !mapping.not_null_columns.is_empty() {
            for column in &mapping.not_null_columns {
                if !self.source.value(&prepend(prefix, column))?.is_null() {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        if !prefix.is_empty() {
            return Ok(self
                .source
                .columns()
                .iter()
                .any(|info| info.name.to_uppercase().starts_with(prefix)));
        }
        Ok(true)
    }

    /// Ensures a collection-typed destination slot holds a container.
    pub(super) fn instantiate_collection(
        &mut self,
        holder: ObjectId,
        mapping: &PropertyMapping,
    ) -> Result<()> {
        let Some(property) = &mapping.property else {
            return Ok(());
        };
        let descriptor = self.catalog().descriptor(self.graph[holder].descriptor())?;
        let Some(decl) = descriptor.properties.get(property) else {
            return Ok(());
        };
        if self.engine.factory.is_collection(decl) && self.graph.property(holder, property).is_null()
        {
            let container = self.engine.factory.create_collection();
            self.graph.set_property(holder, property.clone(), container);
        }
        Ok(())
    }

    /// Binds a nested or linked value into its destination slot: collection
    /// append when the slot is a container, scalar set otherwise.
    pub(super) fn link_objects(
        &mut self,
        holder: ObjectId,
        mapping: &PropertyMapping,
        value: Value,
    ) -> Result<()> {
        let Some(property) = &mapping.property else {
            return Ok(());
        };
        self.instantiate_collection(holder, mapping)?;
        if self.graph.property(holder, property).is_list() {
            self.graph.push_property(holder, property, value);
        } else {
            self.graph.set_property(holder, property.clone(), value);
        }
        Ok(())
    }
}
