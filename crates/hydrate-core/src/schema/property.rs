use super::{SchemaId, StatementId};
use crate::row::SourceType;

/// One binding instruction within a mapping schema.
///
/// Exactly one of {nested schema, nested sub-query, plain column} drives
/// value acquisition for a mapping; the builder validates the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMapping {
    /// Destination property. Absent means the value is consumed but not
    /// stored (secondary-result-set placeholders).
    pub property: Option<String>,

    /// Source column for plain and nested-sub-query mappings.
    pub column: Option<String>,

    /// Composite (property, column) pairs for composite foreign keys.
    pub composites: Vec<CompositeMapping>,

    /// Association materialized from the same row via another schema.
    pub nested_schema: Option<SchemaId>,

    /// Column prefix applied when materializing the nested schema.
    pub column_prefix: Option<String>,

    /// Association loaded through a separate sub-query.
    pub nested_query: Option<StatementId>,

    /// Name of the secondary result set this mapping links against.
    pub result_set: Option<String>,

    /// Linking columns read from the primary row.
    pub columns: Vec<String>,

    /// Linking columns read from the secondary rows.
    pub foreign_columns: Vec<String>,

    /// Defer the nested sub-query until first access.
    pub lazy: bool,

    /// Declared destination type, when it differs from the property's.
    pub declared: Option<SourceType>,

    /// Not-null gate: at least one must be non-null for the nested object
    /// to be created for a row.
    pub not_null_columns: Vec<String>,

    /// Participates in row-identity key derivation.
    pub identity: bool,

    /// Evaluated as a constructor argument rather than a setter.
    pub constructor_arg: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeMapping {
    pub property: String,
    pub column: String,
}

impl PropertyMapping {
    fn new(property: Option<String>) -> PropertyMapping {
        PropertyMapping {
            property,
            column: None,
            composites: vec![],
            nested_schema: None,
            column_prefix: None,
            nested_query: None,
            result_set: None,
            columns: vec![],
            foreign_columns: vec![],
            lazy: false,
            declared: None,
            not_null_columns: vec![],
            identity: false,
            constructor_arg: false,
        }
    }

    /// Plain column-to-property binding.
    pub fn column(property: impl Into<String>, column: impl Into<String>) -> PropertyMapping {
        let mut mapping = PropertyMapping::new(Some(property.into()));
        mapping.column = Some(column.into());
        mapping
    }

    /// Column binding that participates in row-identity derivation.
    pub fn identity(property: impl Into<String>, column: impl Into<String>) -> PropertyMapping {
        let mut mapping = PropertyMapping::column(property, column);
        mapping.identity = true;
        mapping
    }

    /// Association materialized from joined columns of the same row.
    pub fn nested(property: impl Into<String>, schema: impl Into<SchemaId>) -> PropertyMapping {
        let mut mapping = PropertyMapping::new(Some(property.into()));
        mapping.nested_schema = Some(schema.into());
        mapping
    }

    /// Association loaded via a sub-query parameterized from `column`.
    pub fn nested_query(
        property: impl Into<String>,
        statement: impl Into<StatementId>,
        column: impl Into<String>,
    ) -> PropertyMapping {
        let mut mapping = PropertyMapping::new(Some(property.into()));
        mapping.nested_query = Some(statement.into());
        mapping.column = Some(column.into());
        mapping
    }

    /// Association filled in from a named secondary result set.
    pub fn result_set<'a>(
        property: impl Into<String>,
        name: impl Into<String>,
        schema: impl Into<SchemaId>,
        columns: impl IntoIterator<Item = &'a str>,
        foreign_columns: impl IntoIterator<Item = &'a str>,
    ) -> PropertyMapping {
        let mut mapping = PropertyMapping::new(Some(property.into()));
        mapping.result_set = Some(name.into());
        mapping.nested_schema = Some(schema.into());
        mapping.columns = columns.into_iter().map(str::to_string).collect();
        mapping.foreign_columns = foreign_columns.into_iter().map(str::to_string).collect();
        mapping
    }

    /// Consumes a column value without storing it anywhere.
    pub fn placeholder(column: impl Into<String>) -> PropertyMapping {
        let mut mapping = PropertyMapping::new(None);
        mapping.column = Some(column.into());
        mapping
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.column_prefix = Some(prefix.into());
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn declared(mut self, declared: SourceType) -> Self {
        self.declared = Some(declared);
        self
    }

    pub fn not_null<'a>(mut self, columns: impl IntoIterator<Item = &'a str>) -> Self {
        self.not_null_columns = columns.into_iter().map(str::to_string).collect();
        self
    }

    pub fn constructor(mut self) -> Self {
        self.constructor_arg = true;
        self
    }

    pub fn composite(
        mut self,
        property: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.composites.push(CompositeMapping {
            property: property.into(),
            column: column.into(),
        });
        self
    }

    pub fn is_composite(&self) -> bool {
        !self.composites.is_empty()
    }

    /// True when this mapping is resolved by recursing into another schema
    /// against the same row.
    pub fn is_joined(&self) -> bool {
        self.nested_schema.is_some() && self.result_set.is_none()
    }
}
