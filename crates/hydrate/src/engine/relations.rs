use super::Exec;

use hydrate_core::schema::PropertyMapping;
use hydrate_core::{Error, ObjectId, Result, RowSource, Value};

/// Linking key matching primary-row parents to secondary-result-set rows.
///
/// Values are compared in text form. A key with no parts is the degenerate
/// case: all-null linking columns on both sides still match each other,
/// scoped by the result-set name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct LinkKey {
    result_set: String,
    parts: Vec<(String, String)>,
}

/// One parent slot awaiting rows from a secondary result set.
#[derive(Debug, Clone)]
pub(super) struct PendingRelation {
    holder: ObjectId,
    mapping: PropertyMapping,
}

impl<'a, S: RowSource> Exec<'a, S> {
    /// Registers the holder under the linking key computed from the current
    /// (primary) row. At most one mapping may claim a given result-set name.
    pub(super) fn add_pending_relation(
        &mut self,
        holder: ObjectId,
        mapping: &PropertyMapping,
    ) -> Result<()> {
        let Some(name) = &mapping.result_set else {
            return Ok(());
        };
        let key = self.link_key(name, &mapping.columns, &mapping.columns)?;
        self.pending_relations
            .entry(key)
            .or_default()
            .push(PendingRelation {
                holder,
                mapping: mapping.clone(),
            });
        match self.next_result_schemas.get(name) {
            None => {
                self.next_result_schemas
                    .insert(name.clone(), mapping.clone());
                Ok(())
            }
            Some(previous) if previous == mapping => Ok(()),
            Some(_) => Err(Error::result_set_conflict(name.clone())),
        }
    }

    /// Attaches a secondary-row value to every pending parent whose linking
    /// key matches the current (secondary) row.
    pub(super) fn link_to_parents(
        &mut self,
        mapping: &PropertyMapping,
        value: Value,
    ) -> Result<()> {
        let Some(name) = &mapping.result_set else {
            return Ok(());
        };
        if value.is_null() {
            return Ok(());
        }
        let key = self.link_key(name, &mapping.columns, &mapping.foreign_columns)?;
        let Some(parents) = self.pending_relations.get(&key).cloned() else {
            return Ok(());
        };
        for parent in parents {
            self.link_objects(parent.holder, &parent.mapping, value.clone())?;
        }
        Ok(())
    }

    /// Reads linking columns from the current row; qualifiers are always the
    /// primary-side names so both sides derive equal keys. Null values
    /// contribute nothing.
    fn link_key(&self, result_set: &str, names: &[String], columns: &[String]) -> Result<LinkKey> {
        let mut parts = vec![];
        for (name, column) in names.iter().zip(columns) {
            let value = self.source.value(column)?;
            if let Some(text) = value.to_text() {
                parts.push((name.clone(), text));
            }
        }
        Ok(LinkKey {
            result_set: result_set.to_string(),
            parts,
        })
    }
}
