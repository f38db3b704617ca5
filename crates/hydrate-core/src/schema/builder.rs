use super::{Catalog, MappingSchema, PropertyMapping, StatementSpec, TypeDescriptor};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Builds and validates a [`Catalog`].
///
/// Validation happens here, at build time, never midway through a row:
/// dangling descriptor or schema references, malformed mappings, and
/// mismatched linking column lists are all rejected before the engine runs.
#[derive(Debug, Default)]
pub struct Builder {
    descriptors: IndexMap<super::DescriptorId, TypeDescriptor>,
    schemas: IndexMap<super::SchemaId, MappingSchema>,
    statements: IndexMap<super::StatementId, StatementSpec>,
}

impl Builder {
    pub fn descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        self
    }

    pub fn schema(mut self, schema: MappingSchema) -> Self {
        self.schemas.insert(schema.id.clone(), schema);
        self
    }

    pub fn statement(mut self, statement: StatementSpec) -> Self {
        self.statements.insert(statement.id.clone(), statement);
        self
    }

    pub fn build(mut self) -> Result<Catalog> {
        for schema in self.schemas.values_mut() {
            schema.seal();
        }

        for schema in self.schemas.values() {
            if !self.descriptors.contains_key(&schema.descriptor) {
                return Err(Error::invalid_mapping(format!(
                    "schema `{}` references unknown descriptor `{}`",
                    schema.id, schema.descriptor
                )));
            }
            for mapping in schema.mappings() {
                self.verify_mapping(schema, mapping)?;
            }
            if schema.constructor_mappings().count() > 0 {
                self.verify_constructor_shape(schema)?;
            }
        }

        for statement in self.statements.values() {
            for id in statement.schemas() {
                if !self.schemas.contains_key(id) {
                    return Err(Error::invalid_mapping(format!(
                        "statement `{}` references unknown schema `{}`",
                        statement.id, id
                    )));
                }
            }
        }

        Ok(Catalog {
            descriptors: self.descriptors,
            schemas: self.schemas,
            statements: self.statements,
        })
    }

    fn verify_mapping(&self, schema: &MappingSchema, mapping: &PropertyMapping) -> Result<()> {
        let fail = |message: String| {
            Err(Error::invalid_mapping(format!(
                "schema `{}`: {message}",
                schema.id
            )))
        };

        let acquisition_paths = [
            mapping.nested_schema.is_some() && mapping.result_set.is_none(),
            mapping.nested_query.is_some(),
            mapping.result_set.is_some(),
        ]
        .iter()
        .filter(|driven| **driven)
        .count();

        if acquisition_paths > 1 {
            return fail(format!(
                "mapping for `{}` declares more than one acquisition path",
                mapping.property.as_deref().unwrap_or("<placeholder>")
            ));
        }

        if let Some(id) = &mapping.nested_schema {
            if !self.schemas.contains_key(id) {
                return fail(format!("nested mapping references unknown schema `{id}`"));
            }
        }

        if mapping.result_set.is_some() {
            if mapping.nested_schema.is_none() {
                return fail(format!(
                    "result-set mapping for `{}` must name the schema its rows map to",
                    mapping.property.as_deref().unwrap_or("<placeholder>")
                ));
            }
            if mapping.columns.len() != mapping.foreign_columns.len() {
                return fail(format!(
                    "result-set mapping for `{}` declares {} linking columns but {} foreign columns",
                    mapping.property.as_deref().unwrap_or("<placeholder>"),
                    mapping.columns.len(),
                    mapping.foreign_columns.len()
                ));
            }
        } else if acquisition_paths == 0
            && mapping.column.is_none()
            && !mapping.is_composite()
        {
            return fail(format!(
                "mapping for `{}` binds neither a column nor an association",
                mapping.property.as_deref().unwrap_or("<placeholder>")
            ));
        }

        Ok(())
    }

    fn verify_constructor_shape(&self, schema: &MappingSchema) -> Result<()> {
        let arity = schema.constructor_mappings().count();
        let descriptor = &self.descriptors[&schema.descriptor];
        if !descriptor
            .constructors
            .iter()
            .any(|c| c.params.len() == arity)
        {
            return Err(Error::invalid_mapping(format!(
                "schema `{}` declares {arity} constructor arguments but descriptor `{}` \
                 has no constructor of that arity",
                schema.id, descriptor.id
            )));
        }
        Ok(())
    }
}
