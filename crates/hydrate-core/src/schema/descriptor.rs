use crate::row::SourceType;

use indexmap::IndexMap;
use std::fmt;

/// Identifies a destination type registered in the catalog.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorId(Box<str>);

/// Overall shape of a destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// Named property slots
    Record,
    /// Generic string-keyed map; every column binds by name
    Map,
    /// The whole row collapses to one converted value
    Scalar(SourceType),
}

/// One named property slot of a destination type.
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub declared: SourceType,
    /// Primitive (non-nullable) slots must never receive a null write.
    pub nullable: bool,
    pub collection: bool,
    pub settable: bool,
}

/// One constructor of a destination type, with ordered parameters.
#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub params: Vec<ParamDecl>,
    /// Marked as the constructor automatic matching should prefer.
    pub automap_preferred: bool,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub declared: SourceType,
}

/// Registration-time capability table for one destination type.
///
/// Replaces reflective access: the catalog records, per type, which
/// properties exist and can be set, and which constructors are available
/// with which parameter shapes.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub id: DescriptorId,
    pub shape: TypeShape,
    pub properties: IndexMap<String, PropertyDecl>,
    pub constructors: Vec<ConstructorDecl>,
    pub default_constructible: bool,
}

impl TypeDescriptor {
    /// A record type with a usable no-argument constructor.
    pub fn record(id: impl Into<DescriptorId>) -> TypeDescriptor {
        TypeDescriptor {
            id: id.into(),
            shape: TypeShape::Record,
            properties: IndexMap::new(),
            constructors: vec![],
            default_constructible: true,
        }
    }

    /// A generic string-keyed map destination.
    pub fn map(id: impl Into<DescriptorId>) -> TypeDescriptor {
        TypeDescriptor {
            id: id.into(),
            shape: TypeShape::Map,
            properties: IndexMap::new(),
            constructors: vec![],
            default_constructible: true,
        }
    }

    /// A scalar destination converted from a single column.
    pub fn scalar(id: impl Into<DescriptorId>, target: SourceType) -> TypeDescriptor {
        TypeDescriptor {
            id: id.into(),
            shape: TypeShape::Scalar(target),
            properties: IndexMap::new(),
            constructors: vec![],
            default_constructible: false,
        }
    }

    pub fn property(self, name: impl Into<String>, declared: SourceType) -> Self {
        self.declare(name, declared, true, false)
    }

    /// A primitive-typed property; never receives a null write.
    pub fn primitive(self, name: impl Into<String>, declared: SourceType) -> Self {
        self.declare(name, declared, false, false)
    }

    /// A collection property; nested and linked values append to it.
    pub fn collection(self, name: impl Into<String>) -> Self {
        self.declare(name, SourceType::List, true, true)
    }

    fn declare(
        mut self,
        name: impl Into<String>,
        declared: SourceType,
        nullable: bool,
        collection: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            PropertyDecl {
                name,
                declared,
                nullable,
                collection,
                settable: true,
            },
        );
        self
    }

    pub fn constructor<'a>(
        mut self,
        params: impl IntoIterator<Item = (&'a str, SourceType)>,
    ) -> Self {
        self.constructors.push(ConstructorDecl {
            params: params
                .into_iter()
                .map(|(name, declared)| ParamDecl {
                    name: name.to_string(),
                    declared,
                })
                .collect(),
            automap_preferred: false,
        });
        self
    }

    /// Like [`TypeDescriptor::constructor`], but preferred by automatic
    /// constructor matching regardless of column count.
    pub fn preferred_constructor<'a>(
        mut self,
        params: impl IntoIterator<Item = (&'a str, SourceType)>,
    ) -> Self {
        self = self.constructor(params);
        self.constructors.last_mut().unwrap().automap_preferred = true;
        self
    }

    pub fn no_default_constructor(mut self) -> Self {
        self.default_constructible = false;
        self
    }

    /// Finds a property by a column-derived name, case-insensitively,
    /// optionally normalizing snake_case to camelCase first.
    pub fn find_property(&self, name: &str, snake_to_camel: bool) -> Option<&PropertyDecl> {
        let direct = self
            .properties
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name));
        if direct.is_some() || !snake_to_camel {
            return direct;
        }
        let camel = heck::AsLowerCamelCase(name).to_string();
        self.properties
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(&camel))
    }
}

impl DescriptorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DescriptorId {
    fn from(src: &str) -> DescriptorId {
        DescriptorId(src.into())
    }
}

impl From<String> for DescriptorId {
    fn from(src: String) -> DescriptorId {
        DescriptorId(src.into())
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

impl fmt::Debug for DescriptorId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "DescriptorId({})", self.0)
    }
}
