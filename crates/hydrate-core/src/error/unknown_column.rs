use super::Error;

/// Error for an unmapped column that automatic mapping cannot place.
///
/// Only raised under the failing unknown-column policy; the default policy
/// ignores such columns and the warning policy logs them.
#[derive(Debug)]
pub(super) struct UnknownColumnError {
    column: Box<str>,
    schema: Box<str>,
}

impl std::error::Error for UnknownColumnError {}

impl core::fmt::Display for UnknownColumnError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unknown column `{}` during automatic mapping of schema `{}`",
            self.column, self.schema
        )
    }
}

impl Error {
    /// Creates an unknown column error.
    pub fn unknown_column(column: impl Into<String>, schema: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownColumn(UnknownColumnError {
            column: column.into().into(),
            schema: schema.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown column error.
    pub fn is_unknown_column(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownColumn(_))
    }
}
