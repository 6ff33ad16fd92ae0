use std::fmt;

/// Errors raised while configuring enrichment.
///
/// These surface synchronously from the registration calls, before any
/// request is processed. Request-time conditions (no request, anonymous
/// user, missing claim) are never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A registration argument was rejected
    InvalidArgument {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Why the value was rejected
        reason: &'static str,
    },
}

impl Error {
    /// Creates an invalid-argument error for `parameter`.
    pub fn invalid_argument(parameter: &'static str, reason: &'static str) -> Self {
        Error::InvalidArgument { parameter, reason }
    }

    /// Returns the name of the rejected parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            Error::InvalidArgument { parameter, .. } => parameter,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument { parameter, reason } => {
                write!(f, "Invalid argument '{}': {}", parameter, reason)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Rejects empty or whitespace-only strings.
pub(crate) fn require_non_blank<'a>(
    value: &'a str,
    parameter: &'static str,
) -> Result<&'a str, Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(
            parameter,
            "value cannot be empty or whitespace",
        ));
    }
    Ok(value)
}
