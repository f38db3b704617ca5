use super::Error;

/// Error when automatic constructor matching finds no qualifying constructor.
///
/// Raised while instantiating a destination that declares no constructor
/// mappings and no default constructor: none of the type's declared
/// constructors matched the result set's columns by arity and conversion
/// capability.
#[derive(Debug)]
pub(super) struct ConstructorMismatchError {
    type_name: Box<str>,
    columns: Box<[String]>,
}

impl std::error::Error for ConstructorMismatchError {}

impl core::fmt::Display for ConstructorMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "no qualifying constructor found for `{}` matching columns [{}]",
            self.type_name,
            self.columns.join(", ")
        )
    }
}

impl Error {
    /// Creates a constructor mismatch error.
    pub fn constructor_mismatch(type_name: impl Into<String>, columns: &[String]) -> Error {
        Error::from(super::ErrorKind::ConstructorMismatch(
            ConstructorMismatchError {
                type_name: type_name.into().into(),
                columns: columns.to_vec().into(),
            },
        ))
    }

    /// Returns `true` if this error is a constructor mismatch error.
    pub fn is_constructor_mismatch(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConstructorMismatch(_))
    }
}
