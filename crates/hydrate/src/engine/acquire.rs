use super::{prepend, Exec};

use hydrate_core::row::SourceType;
use hydrate_core::schema::PropertyMapping;
use hydrate_core::{ObjectId, Result, RowSource, Value};

/// Engine-internal acquisition outcome.
///
/// Expected negatives are data, not errors: `Deferred` means the value will
/// arrive later (secondary result set), `None` means no value was derived
/// from this row.
pub(super) enum Acquired {
    Found(Value),
    Deferred,
    None,
}

impl<'a, S: RowSource> Exec<'a, S> {
    /// Acquires the value for one explicit property mapping.
    pub(super) fn acquire(
        &mut self,
        mapping: &PropertyMapping,
        holder: ObjectId,
        prefix: &str,
    ) -> Result<Acquired> {
        if mapping.nested_query.is_some() {
            return self.nested_query_value(mapping, prefix);
        }
        if mapping.result_set.is_some() {
            // The slot exists even if no secondary row ever links to it.
            self.instantiate_collection(holder, mapping)?;
            self.add_pending_relation(holder, mapping)?;
            return Ok(Acquired::Deferred);
        }
        let Some(column) = &mapping.column else {
            return Ok(Acquired::None);
        };
        let declared = self.declared_for(mapping, holder);
        let value = self.read(&prepend(prefix, column), declared)?;
        Ok(if value.is_null() {
            Acquired::None
        } else {
            Acquired::Found(value)
        })
    }

    /// Conversion target for a plain column mapping: the mapping's declared
    /// type, else the destination property's.
    fn declared_for(&self, mapping: &PropertyMapping, holder: ObjectId) -> Option<SourceType> {
        if mapping.declared.is_some() {
            return mapping.declared;
        }
        let property = mapping.property.as_deref()?;
        let descriptor = self
            .catalog()
            .descriptor(self.graph[holder].descriptor())
            .ok()?;
        descriptor.properties.get(property).map(|decl| decl.declared)
    }
}
