/// Errors that can happen inside homepage_core.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A required constructor argument was not supplied.
    #[error("missing required argument `{name}`")]
    MissingArgument {
        /// Name of the missing parameter.
        name: &'static str,
    },
}

impl Error {
    /// Name of the parameter this error is about.
    #[must_use]
    pub fn param_name(&self) -> &'static str {
        match self {
            Self::MissingArgument { name } => name,
        }
    }
}
