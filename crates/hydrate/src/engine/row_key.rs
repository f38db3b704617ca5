use super::{prepend, Exec};

use hydrate_core::key::{KeyBuilder, RowKey};
use hydrate_core::schema::{MappingSchema, PropertyMapping, TypeDescriptor, TypeShape};
use hydrate_core::{Result, RowSource};

impl<'a, S: RowSource> Exec<'a, S> {
    /// Derives the row-identity key for a schema against the current row.
    ///
    /// Identity-marked mappings are preferred; without any, every property
    /// mapping contributes. A schema with no mapping information keys a map
    /// destination on every column, anything else on the unmapped columns
    /// that resolve to a destination property. Keys that no column
    /// contributed to collapse to [`RowKey::Null`].
    pub(crate) fn create_row_key(
        &self,
        schema: &'a MappingSchema,
        prefix: &str,
    ) -> Result<RowKey> {
        let mut builder = RowKey::builder(schema.id.clone());

        let identity: Vec<&PropertyMapping> = schema.identity_mappings().collect();
        let mappings: Vec<&PropertyMapping> = if identity.is_empty() {
            schema.property_mappings().collect()
        } else {
            identity
        };

        if mappings.is_empty() {
            let descriptor = self.catalog().descriptor(&schema.descriptor)?;
            if matches!(descriptor.shape, TypeShape::Map) {
                self.key_from_all_columns(&mut builder)?;
            } else {
                self.key_from_unmapped_columns(schema, descriptor, &mut builder, prefix)?;
            }
        } else {
            self.key_from_mappings(schema, &mappings, &mut builder, prefix)?;
        }
        Ok(builder.finish())
    }

    /// Contributions from explicit mappings, read through each mapping's
    /// conversion reference. The qualifier is the full prefixed column name
    /// so two same-schema associations under one parent never collide.
    fn key_from_mappings(
        &self,
        schema: &'a MappingSchema,
        mappings: &[&PropertyMapping],
        builder: &mut KeyBuilder,
        prefix: &str,
    ) -> Result<()> {
        let split = self.column_split(schema, prefix);
        for mapping in mappings {
            // Only plainly-bound mappings identify a row.
            if mapping.nested_schema.is_some()
                || mapping.nested_query.is_some()
                || mapping.result_set.is_some()
            {
                continue;
            }
            let Some(column) = &mapping.column else {
                continue;
            };
            let column = prepend(prefix, column);
            if !split.is_mapped(&column) {
                continue;
            }
            let value = self.read(&column, mapping.declared)?;
            if !value.is_null() || self.engine.config.instance_for_empty_row {
                builder.update(column, value);
            }
        }
        Ok(())
    }

    /// Contributions from unmapped columns whose prefix-stripped name
    /// resolves to a destination property; values are read raw.
    fn key_from_unmapped_columns(
        &self,
        schema: &'a MappingSchema,
        descriptor: &'a TypeDescriptor,
        builder: &mut KeyBuilder,
        prefix: &str,
    ) -> Result<()> {
        let split = self.column_split(schema, prefix);
        let upper_prefix = prefix.to_uppercase();
        for column in &split.unmapped {
            let property = if upper_prefix.is_empty() {
                column.as_str()
            } else if column.to_uppercase().starts_with(&upper_prefix) {
                &column[upper_prefix.len()..]
            } else {
                continue;
            };
            if descriptor
                .find_property(property, self.engine.config.snake_to_camel)
                .is_none()
            {
                continue;
            }
            let value = self.source.value(column)?;
            if !value.is_null() {
                builder.update(column.clone(), value);
            }
        }
        Ok(())
    }

    /// Map destinations key on every non-null column of the row.
    fn key_from_all_columns(&self, builder: &mut KeyBuilder) -> Result<()> {
        let columns: Vec<String> = self
            .source
            .columns()
            .iter()
            .map(|info| info.name.clone())
            .collect();
        for column in columns {
            let value = self.source.value(&column)?;
            if !value.is_null() {
                builder.update(column, value);
            }
        }
        Ok(())
    }
}
