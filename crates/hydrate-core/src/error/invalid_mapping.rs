use super::Error;

/// Error when a mapping catalog or statement definition is invalid.
///
/// This occurs when:
/// - A catalog has duplicate schema or descriptor names
/// - A schema references an unknown descriptor or nested schema
/// - A result-set mapping declares mismatched linking column lists
/// - A statement maps result sets without any registered schema
///
/// These errors are caught during catalog construction or at the start of a
/// statement's materialization, never midway through a row.
#[derive(Debug)]
pub(super) struct InvalidMappingError {
    message: Box<str>,
}

impl std::error::Error for InvalidMappingError {}

impl core::fmt::Display for InvalidMappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid mapping: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMapping(InvalidMappingError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid mapping error.
    pub fn is_invalid_mapping(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidMapping(_))
    }
}
