use super::{child_prefix, prepend, Exec};

use hydrate_core::exec::LoadPlan;
use hydrate_core::row::{ColumnInfo, SourceType};
use hydrate_core::schema::{MappingSchema, PropertyMapping, TypeDescriptor, TypeShape};
use hydrate_core::{bail, Error, ObjectId, Result, RowSource, Value};

/// Outcome of the instantiation decision ladder.
///
/// Absence is a first-class outcome here: a row from which no value could be
/// derived produces `None`, never an error.
pub(super) enum Created {
    None,
    /// The whole row collapsed to one converted value; binding is skipped.
    Scalar(Value),
    Object {
        id: ObjectId,
        /// Constructor-built objects always count as having found values.
        constructor_built: bool,
    },
}

impl<'a, S: RowSource> Exec<'a, S> {
    /// Decision ladder, first match wins: scalar conversion, declared
    /// constructor mappings, default construction, automatic constructor
    /// matching.
    pub(super) fn create_result_object(
        &mut self,
        schema: &'a MappingSchema,
        prefix: &str,
    ) -> Result<Created> {
        let descriptor = self.catalog().descriptor(&schema.descriptor)?;
        if let TypeShape::Scalar(target) = descriptor.shape {
            return self.create_scalar(schema, target, prefix);
        }
        let constructor: Vec<&PropertyMapping> = schema.constructor_mappings().collect();
        if !constructor.is_empty() {
            return self.create_with_declared_constructor(descriptor, &constructor, prefix);
        }
        if descriptor.default_constructible {
            let instance = self.engine.factory.create(descriptor)?;
            return Ok(Created::Object {
                id: self.graph.insert(instance),
                constructor_built: false,
            });
        }
        if self.should_auto_map(schema, false) {
            return self.create_by_constructor_signature(descriptor);
        }
        bail!("do not know how to create an instance of `{}`", descriptor.id)
    }

    /// Single-value path: the column named by the schema's first mapping, or
    /// the result set's sole column when the schema declares none.
    fn create_scalar(
        &mut self,
        schema: &'a MappingSchema,
        target: SourceType,
        prefix: &str,
    ) -> Result<Created> {
        let column = match schema.mappings().first().and_then(|m| m.column.as_deref()) {
            Some(column) => prepend(prefix, column),
            None => match self.source.columns().first() {
                Some(info) => info.name.clone(),
                None => return Ok(Created::None),
            },
        };
        let value = self.read(&column, Some(target))?;
        Ok(if value.is_null() {
            Created::None
        } else {
            Created::Scalar(value)
        })
    }

    /// Evaluates declared constructor mappings in order. The constructor is
    /// only invoked when at least one argument is non-null.
    fn create_with_declared_constructor(
        &mut self,
        descriptor: &'a TypeDescriptor,
        mappings: &[&PropertyMapping],
        prefix: &str,
    ) -> Result<Created> {
        let mut found = false;
        let mut args = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let value = if let Some(statement) = &mapping.nested_query {
                // A constructor cannot receive a deferred slot; sub-query
                // arguments always load eagerly.
                match self.nested_query_param(mapping, prefix)? {
                    Some(param) => {
                        let plan = LoadPlan::new(statement.clone(), param, mapping.declared);
                        plan.load(&*self.engine.executor)?
                    }
                    None => Value::Null,
                }
            } else if let Some(nested_id) = &mapping.nested_schema {
                // The argument's discriminator reads columns under the same
                // effective prefix its mappings do.
                let nested_prefix = child_prefix(prefix, mapping);
                let nested =
                    self.resolve_discriminator(self.catalog().schema(nested_id)?, &nested_prefix)?;
                self.materialize_simple(nested, &nested_prefix)?
            } else {
                match &mapping.column {
                    Some(column) => self.read(&prepend(prefix, column), mapping.declared)?,
                    None => Value::Null,
                }
            };
            found |= !value.is_null();
            args.push(value);
        }
        if !found {
            return Ok(Created::None);
        }

        let index = descriptor
            .constructors
            .iter()
            .position(|c| c.params.len() == args.len())
            .ok_or_else(|| {
                Error::invalid_mapping(format!(
                    "descriptor `{}` has no constructor taking {} arguments",
                    descriptor.id,
                    args.len()
                ))
            })?;
        let instance = self.engine.factory.create_with_args(descriptor, index, args)?;
        Ok(Created::Object {
            id: self.graph.insert(instance),
            constructor_built: true,
        })
    }

    /// Positional automatic matching against the result set's columns.
    fn create_by_constructor_signature(
        &mut self,
        descriptor: &'a TypeDescriptor,
    ) -> Result<Created> {
        let columns: Vec<ColumnInfo> = self.source.columns().to_vec();
        let chosen = self.find_constructor_for_automapping(descriptor, &columns)?;
        let decl = &descriptor.constructors[chosen];

        let mut found = false;
        let mut args = Vec::with_capacity(decl.params.len());
        for (param, column) in decl.params.iter().zip(&columns) {
            let value = self.read(&column.name, Some(param.declared))?;
            found |= !value.is_null();
            args.push(value);
        }
        if !found {
            return Ok(Created::None);
        }
        let instance = self.engine.factory.create_with_args(descriptor, chosen, args)?;
        Ok(Created::Object {
            id: self.graph.insert(instance),
            constructor_built: true,
        })
    }

    /// A sole constructor is taken as-is; otherwise prefer one marked for
    /// automapping, else the first whose arity and parameter types fit the
    /// columns positionally.
    fn find_constructor_for_automapping(
        &self,
        descriptor: &TypeDescriptor,
        columns: &[ColumnInfo],
    ) -> Result<usize> {
        if descriptor.constructors.len() == 1 {
            return Ok(0);
        }
        if let Some(index) = descriptor
            .constructors
            .iter()
            .position(|c| c.automap_preferred)
        {
            return Ok(index);
        }
        descriptor
            .constructors
            .iter()
            .position(|c| {
                c.params.len() == columns.len()
                    && c.params.iter().zip(columns).all(|(param, column)| {
                        self.engine
                            .converters
                            .has_converter(param.declared, column.source)
                    })
            })
            .ok_or_else(|| {
                let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
                Error::constructor_mismatch(descriptor.id.as_str(), &names)
            })
    }
}
