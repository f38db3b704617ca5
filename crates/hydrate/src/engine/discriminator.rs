use super::{prepend, Exec};

use hydrate_core::schema::{MappingSchema, SchemaId};
use hydrate_core::{Result, RowSource};

use std::collections::HashSet;

impl<'a, S: RowSource> Exec<'a, S> {
    /// Per-row polymorphic schema selection.
    ///
    /// Iterates while the effective schema carries a discriminator; an
    /// unresolvable value, an unknown candidate schema, or a revisited one
    /// stops the chain at the last good schema. Never fails on the value
    /// itself.
    pub(crate) fn resolve_discriminator(
        &self,
        schema: &'a MappingSchema,
        prefix: &str,
    ) -> Result<&'a MappingSchema> {
        let mut current = schema;
        let mut visited: HashSet<&SchemaId> = HashSet::new();
        while let Some(discriminator) = &current.discriminator {
            let column = prepend(prefix, &discriminator.column);
            let value = self.read(&column, Some(discriminator.declared))?;
            let Some(text) = value.to_text() else { break };
            let Some(candidate) = discriminator.schema_for(&text) else {
                break;
            };
            let Some(next) = self.catalog().try_schema(candidate) else {
                break;
            };
            // Cycle guard: a candidate already resolved in this chain ends
            // the resolution.
            if !visited.insert(&next.id) {
                break;
            }
            current = next;
        }
        Ok(current)
    }
}
