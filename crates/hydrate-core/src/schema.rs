mod builder;
pub use builder::Builder;

mod descriptor;
pub use descriptor::{
    ConstructorDecl, DescriptorId, ParamDecl, PropertyDecl, TypeDescriptor, TypeShape,
};

mod discriminator;
pub use discriminator::Discriminator;

mod mapping;
pub use mapping::{MappingSchema, SchemaId};

mod property;
pub use property::{CompositeMapping, PropertyMapping};

mod statement;
pub use statement::{StatementId, StatementSpec};

use crate::{Error, Result};
use indexmap::IndexMap;

/// Registry of type descriptors, mapping schemas, and statement specs.
///
/// Built once through [`Builder`], which validates every cross-reference so
/// the engine never discovers a dangling id midway through a row.
#[derive(Debug)]
pub struct Catalog {
    descriptors: IndexMap<DescriptorId, TypeDescriptor>,
    schemas: IndexMap<SchemaId, MappingSchema>,
    statements: IndexMap<StatementId, StatementSpec>,
}

impl Catalog {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn descriptor(&self, id: &DescriptorId) -> Result<&TypeDescriptor> {
        self.descriptors
            .get(id)
            .ok_or_else(|| Error::invalid_mapping(format!("unknown type descriptor `{id}`")))
    }

    pub fn schema(&self, id: &SchemaId) -> Result<&MappingSchema> {
        self.try_schema(id)
            .ok_or_else(|| Error::invalid_mapping(format!("unknown mapping schema `{id}`")))
    }

    /// Schema lookup that tolerates unknown ids; discriminator resolution
    /// stops at the last good schema rather than failing.
    pub fn try_schema(&self, id: &SchemaId) -> Option<&MappingSchema> {
        self.schemas.get(id)
    }

    pub fn statement(&self, id: &StatementId) -> Result<&StatementSpec> {
        self.statements
            .get(id)
            .ok_or_else(|| Error::invalid_mapping(format!("unknown statement `{id}`")))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &MappingSchema> {
        self.schemas.values()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.values()
    }
}
