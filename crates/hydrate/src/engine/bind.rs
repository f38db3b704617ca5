use super::{acquire::Acquired, prepend, Exec};
use crate::config::{AutoMapPolicy, UnknownColumnPolicy};

use hydrate_core::row::SourceType;
use hydrate_core::schema::{MappingSchema, TypeShape};
use hydrate_core::{Error, ObjectId, Result, RowSource, Value};

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Which of a result set's columns the schema's explicit mappings claim.
///
/// Membership is by prefixed, upper-cased name; the unmapped side keeps the
/// reported names for property lookup and reads.
#[derive(Debug)]
pub(super) struct ColumnSplit {
    mapped: HashSet<String>,
    pub(super) unmapped: Vec<String>,
}

impl ColumnSplit {
    pub(super) fn is_mapped(&self, column: &str) -> bool {
        self.mapped.contains(&column.to_uppercase())
    }
}

/// One memoized automatic binding: unmapped column to settable property.
#[derive(Debug)]
pub(super) struct AutoMapping {
    column: String,
    property: String,
    declared: Option<SourceType>,
    nullable: bool,
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<'a, S: RowSource> Exec<'a, S> {
    /// Resolves the automapping policy for one schema evaluation.
    pub(super) fn should_auto_map(&self, schema: &MappingSchema, nested: bool) -> bool {
        if let Some(enabled) = schema.auto_mapping {
            return enabled;
        }
        match self.engine.config.auto_mapping {
            AutoMapPolicy::None => false,
            AutoMapPolicy::Partial => !nested,
            AutoMapPolicy::Full => true,
        }
    }

    /// Applies every applicable explicit mapping to the object. Returns
    /// whether any property received a value or a deferred placeholder.
    pub(super) fn apply_property_mappings(
        &mut self,
        schema: &'a MappingSchema,
        holder: ObjectId,
        prefix: &str,
    ) -> Result<bool> {
        let split = self.column_split(schema, prefix);
        let descriptor = self.catalog().descriptor(&schema.descriptor)?;
        let mut found = false;
        for mapping in schema.property_mappings() {
            // A column attribute on a joined mapping is ignored; the nested
            // recursion owns that mapping.
            let column = if mapping.is_joined() {
                None
            } else {
                mapping.column.as_deref().map(|c| prepend(prefix, c))
            };
            let eligible = mapping.is_composite()
                || column.as_deref().map(|c| split.is_mapped(c)).unwrap_or(false)
                || mapping.result_set.is_some();
            if !eligible {
                continue;
            }

            let outcome = self.acquire(mapping, holder, prefix)?;
            let Some(property) = &mapping.property else {
                continue;
            };
            match outcome {
                Acquired::Deferred => found = true,
                Acquired::Found(value) => {
                    found = true;
                    self.graph.set_property(holder, property.clone(), value);
                }
                Acquired::None => {
                    let nullable = descriptor
                        .properties
                        .get(property)
                        .map(|decl| decl.nullable)
                        .unwrap_or(true);
                    if self.engine.config.bind_nulls && nullable {
                        self.graph.set_property(holder, property.clone(), Value::Null);
                    }
                }
            }
        }
        Ok(found)
    }

    /// Binds otherwise-unmapped columns per the memoized automap plan.
    pub(super) fn apply_automatic_mappings(
        &mut self,
        schema: &'a MappingSchema,
        holder: ObjectId,
        prefix: &str,
    ) -> Result<bool> {
        let plan = self.auto_mappings(schema, prefix)?;
        let mut found = false;
        for auto in plan.iter() {
            let value = self.read(&auto.column, auto.declared)?;
            if !value.is_null() {
                found = true;
                self.graph.set_property(holder, auto.property.clone(), value);
            } else if self.engine.config.bind_nulls && auto.nullable {
                self.graph
                    .set_property(holder, auto.property.clone(), Value::Null);
            }
        }
        Ok(found)
    }

    /// Splits the current result set's columns for a (schema, prefix) pair,
    /// memoizing on the engine.
    pub(super) fn column_split(&self, schema: &'a MappingSchema, prefix: &str) -> Arc<ColumnSplit> {
        let key = (schema.id.clone(), prefix.to_string());
        if let Some(hit) = read_lock(&self.engine.splits).get(&key) {
            return hit.clone();
        }

        let claimed: HashSet<String> = schema
            .mapped_columns()
            .iter()
            .map(|column| prepend(&prefix.to_uppercase(), column))
            .collect();
        let mut mapped = HashSet::new();
        let mut unmapped = vec![];
        for info in self.source.columns() {
            let upper = info.name.to_uppercase();
            if claimed.contains(&upper) {
                mapped.insert(upper);
            } else {
                unmapped.push(info.name.clone());
            }
        }
        let split = Arc::new(ColumnSplit { mapped, unmapped });

        write_lock(&self.engine.splits)
            .entry(key)
            .or_insert(split)
            .clone()
    }

    fn auto_mappings(&self, schema: &'a MappingSchema, prefix: &str) -> Result<Arc<[AutoMapping]>> {
        let key = (schema.id.clone(), prefix.to_string());
        if let Some(hit) = read_lock(&self.engine.automaps).get(&key) {
            return Ok(hit.clone());
        }
        let computed = self.compute_auto_mappings(schema, prefix)?;
        Ok(write_lock(&self.engine.automaps)
            .entry(key)
            .or_insert(computed)
            .clone())
    }

    fn compute_auto_mappings(
        &self,
        schema: &'a MappingSchema,
        prefix: &str,
    ) -> Result<Arc<[AutoMapping]>> {
        let split = self.column_split(schema, prefix);
        let descriptor = self.catalog().descriptor(&schema.descriptor)?;
        let is_map = matches!(descriptor.shape, TypeShape::Map);
        let upper_prefix = prefix.to_uppercase();
        let mut mappings = vec![];
        for column in &split.unmapped {
            let stripped = if upper_prefix.is_empty() {
                column.as_str()
            } else if column.to_uppercase().starts_with(&upper_prefix) {
                &column[upper_prefix.len()..]
            } else {
                continue;
            };

            // Generic map destinations accept every column by name.
            if is_map {
                mappings.push(AutoMapping {
                    column: column.clone(),
                    property: stripped.to_string(),
                    declared: None,
                    nullable: true,
                });
                continue;
            }

            match descriptor.find_property(stripped, self.engine.config.snake_to_camel) {
                Some(decl) if decl.settable => {
                    if schema.mapped_properties().contains(&decl.name) {
                        continue;
                    }
                    let source = self
                        .source
                        .source_type(column)
                        .unwrap_or(SourceType::Unknown);
                    if self.engine.converters.has_converter(decl.declared, source) {
                        mappings.push(AutoMapping {
                            column: column.clone(),
                            property: decl.name.clone(),
                            declared: Some(decl.declared),
                            nullable: decl.nullable,
                        });
                    } else {
                        self.unknown_column(schema, column)?;
                    }
                }
                _ => self.unknown_column(schema, column)?,
            }
        }
        Ok(mappings.into())
    }

    fn unknown_column(&self, schema: &MappingSchema, column: &str) -> Result<()> {
        match self.engine.config.unknown_columns {
            UnknownColumnPolicy::Ignore => Ok(()),
            UnknownColumnPolicy::Warn => {
                log::warn!(
                    "unknown column `{column}` during automatic mapping of schema `{}`",
                    schema.id
                );
                Ok(())
            }
            UnknownColumnPolicy::Fail => {
                Err(Error::unknown_column(column, schema.id.as_str().to_string()))
            }
        }
    }
}
