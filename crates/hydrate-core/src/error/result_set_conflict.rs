use super::Error;

/// Error when two different property mappings claim the same secondary
/// result set.
///
/// A secondary result set name may be associated with exactly one property
/// mapping per statement; rows from that result set could otherwise not be
/// routed unambiguously.
#[derive(Debug)]
pub(super) struct ResultSetConflictError {
    name: Box<str>,
}

impl std::error::Error for ResultSetConflictError {}

impl core::fmt::Display for ResultSetConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "two different properties are mapped to result set `{}`",
            self.name
        )
    }
}

impl Error {
    /// Creates a result set conflict error.
    pub fn result_set_conflict(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ResultSetConflict(ResultSetConflictError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is a result set conflict error.
    pub fn is_result_set_conflict(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ResultSetConflict(_))
    }
}
