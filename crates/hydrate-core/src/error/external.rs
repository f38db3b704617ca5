use super::Error;

/// Error from an external collaborator.
#[derive(Debug)]
pub(super) struct ExternalError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ExternalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for ExternalError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Display the error and walk its source chain
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from an external collaborator failure.
    ///
    /// This is the preferred way to surface failures raised by a tabular row
    /// source or a sub-query executor implementation.
    pub fn external(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::External(ExternalError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error is an external collaborator error.
    pub fn is_external(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::External(_))
    }
}
