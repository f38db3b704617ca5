use super::{DescriptorId, Discriminator, PropertyMapping};

use std::collections::HashSet;
use std::fmt;

/// Identifies a mapping schema registered in the catalog.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaId(Box<str>);

/// Declarative description of how to materialize one destination shape from
/// row columns.
#[derive(Debug, Clone)]
pub struct MappingSchema {
    pub id: SchemaId,
    pub descriptor: DescriptorId,
    pub discriminator: Option<Discriminator>,
    /// Per-schema automapping override; `None` defers to the global policy.
    pub auto_mapping: Option<bool>,
    mappings: Vec<PropertyMapping>,

    // Sealed at catalog build.
    has_nested: bool,
    mapped_columns: HashSet<String>,
    mapped_properties: HashSet<String>,
}

impl MappingSchema {
    pub fn new(id: impl Into<SchemaId>, descriptor: impl Into<DescriptorId>) -> MappingSchema {
        MappingSchema {
            id: id.into(),
            descriptor: descriptor.into(),
            discriminator: None,
            auto_mapping: None,
            mappings: vec![],
            has_nested: false,
            mapped_columns: HashSet::new(),
            mapped_properties: HashSet::new(),
        }
    }

    pub fn property(mut self, mapping: PropertyMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn auto_mapping(mut self, enabled: bool) -> Self {
        self.auto_mapping = Some(enabled);
        self
    }

    pub fn mappings(&self) -> &[PropertyMapping] {
        &self.mappings
    }

    /// Mappings applied through property binding (everything that is not a
    /// constructor argument). Constructor columns are never re-applied as
    /// setters.
    pub fn property_mappings(&self) -> impl Iterator<Item = &PropertyMapping> {
        self.mappings.iter().filter(|m| !m.constructor_arg)
    }

    pub fn constructor_mappings(&self) -> impl Iterator<Item = &PropertyMapping> {
        self.mappings.iter().filter(|m| m.constructor_arg)
    }

    pub fn identity_mappings(&self) -> impl Iterator<Item = &PropertyMapping> {
        self.mappings.iter().filter(|m| m.identity)
    }

    pub fn has_identity_mappings(&self) -> bool {
        self.mappings.iter().any(|m| m.identity)
    }

    /// True when any mapping recurses into another schema on the same row.
    pub fn has_nested(&self) -> bool {
        self.has_nested
    }

    /// Upper-cased, unprefixed column names claimed by explicit mappings
    /// (including composites and the discriminator column).
    pub fn mapped_columns(&self) -> &HashSet<String> {
        &self.mapped_columns
    }

    /// Property names claimed by explicit mappings; excluded from automatic
    /// mapping.
    pub fn mapped_properties(&self) -> &HashSet<String> {
        &self.mapped_properties
    }

    /// Computes the derived lookup state. Called once by the catalog builder.
    pub(super) fn seal(&mut self) {
        self.has_nested = self.mappings.iter().any(|m| m.is_joined());

        let mut columns = HashSet::new();
        let mut properties = HashSet::new();
        for mapping in &self.mappings {
            if let Some(column) = &mapping.column {
                columns.insert(column.to_uppercase());
            }
            for composite in &mapping.composites {
                columns.insert(composite.column.to_uppercase());
            }
            if let Some(property) = &mapping.property {
                properties.insert(property.clone());
            }
        }
        if let Some(discriminator) = &self.discriminator {
            columns.insert(discriminator.column.to_uppercase());
        }
        self.mapped_columns = columns;
        self.mapped_properties = properties;
    }
}

impl SchemaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SchemaId {
    fn from(src: &str) -> SchemaId {
        SchemaId(src.into())
    }
}

impl From<String> for SchemaId {
    fn from(src: String) -> SchemaId {
        SchemaId(src.into())
    }
}

impl From<&SchemaId> for SchemaId {
    fn from(src: &SchemaId) -> SchemaId {
        src.clone()
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "SchemaId({})", self.0)
    }
}
