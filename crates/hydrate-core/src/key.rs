use crate::{schema::SchemaId, Value};

/// Identity fingerprint of one logical entity within a result stream.
///
/// A key is accumulated from (qualifier, value) contributions on top of a
/// schema-id seed. A key to which no column contributed carries no identity;
/// it is represented by the distinct [`RowKey::Null`] variant, which the
/// materialized-object cache refuses outright instead of relying on a
/// sentinel that violates equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// No identity established; never cached, never deduplicated.
    Null,

    /// A content-comparable identity.
    Key(IdentityKey),
}

/// The non-degenerate form of a [`RowKey`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    schema: SchemaId,
    parts: Vec<(String, Value)>,
    parent: Option<Box<IdentityKey>>,
}

/// Accumulates contributions into a [`RowKey`].
#[derive(Debug)]
pub struct KeyBuilder {
    schema: SchemaId,
    parts: Vec<(String, Value)>,
}

impl RowKey {
    /// Starts a new key seeded with the schema identity.
    pub fn builder(schema: SchemaId) -> KeyBuilder {
        KeyBuilder {
            schema,
            parts: vec![],
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, RowKey::Null)
    }

    pub fn as_key(&self) -> Option<&IdentityKey> {
        match self {
            RowKey::Null => None,
            RowKey::Key(key) => Some(key),
        }
    }

    /// Scopes this key to its parent's key.
    ///
    /// Defined only when both inputs carry identity; any degenerate input
    /// makes the combination degenerate as well.
    pub fn combine(&self, parent: &RowKey) -> RowKey {
        match (self, parent) {
            (RowKey::Key(child), RowKey::Key(parent)) => {
                let mut combined = child.clone();
                combined.parent = Some(Box::new(parent.clone()));
                RowKey::Key(combined)
            }
            _ => RowKey::Null,
        }
    }
}

impl IdentityKey {
    pub fn schema(&self) -> &SchemaId {
        &self.schema
    }

    /// The (qualifier, value) contributions, in accumulation order.
    pub fn parts(&self) -> &[(String, Value)] {
        &self.parts
    }
}

impl KeyBuilder {
    /// Appends one (qualifier, value) contribution.
    pub fn update(&mut self, qualifier: impl Into<String>, value: Value) {
        self.parts.push((qualifier.into(), value));
    }

    /// Number of column contributions accumulated so far (the schema-id seed
    /// does not count).
    pub fn contributions(&self) -> usize {
        self.parts.len()
    }

    /// Finishes the key; degenerate (no column contributed) keys collapse to
    /// [`RowKey::Null`].
    pub fn finish(self) -> RowKey {
        if self.parts.is_empty() {
            RowKey::Null
        } else {
            RowKey::Key(IdentityKey {
                schema: self.schema,
                parts: self.parts,
                parent: None,
            })
        }
    }
}
