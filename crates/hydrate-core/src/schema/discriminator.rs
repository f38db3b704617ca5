use super::SchemaId;
use crate::row::SourceType;

use indexmap::IndexMap;

/// Per-row polymorphic schema selection.
///
/// The column value is converted via `declared`, stringified, and looked up
/// in `cases`; resolution iterates while the selected schema carries its own
/// discriminator, with a per-call cycle guard.
#[derive(Debug, Clone)]
pub struct Discriminator {
    pub column: String,
    pub declared: SourceType,
    cases: IndexMap<String, SchemaId>,
}

impl Discriminator {
    pub fn new(column: impl Into<String>, declared: SourceType) -> Discriminator {
        Discriminator {
            column: column.into(),
            declared,
            cases: IndexMap::new(),
        }
    }

    pub fn case(mut self, value: impl Into<String>, schema: impl Into<SchemaId>) -> Self {
        self.cases.insert(value.into(), schema.into());
        self
    }

    pub fn schema_for(&self, text: &str) -> Option<&SchemaId> {
        self.cases.get(text)
    }

    pub fn cases(&self) -> impl Iterator<Item = (&str, &SchemaId)> {
        self.cases.iter().map(|(k, v)| (k.as_str(), v))
    }
}
