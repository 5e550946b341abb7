//! Error types for tfpromote-core.

use thiserror::Error;

use crate::types::EnvName;

/// All errors that can arise from environment registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The configured environment list could not be parsed.
    #[error("invalid environment list '{source_text}': {reason}")]
    Configuration { source_text: String, reason: String },

    /// A name or directory segment that is not part of the registry.
    #[error("environment '{name}' is not one of the configured environments ({})", join(.known))]
    UnknownEnvironment { name: String, known: Vec<EnvName> },

    /// The environment is already the lowest one; nothing can be promoted into it.
    #[error("environment '{name}' is the lowest environment and has no lower neighbour")]
    Boundary { name: EnvName },
}

fn join(names: &[EnvName]) -> String {
    names
        .iter()
        .map(EnvName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
