//! Ordered environment registry.
//!
//! # Source format
//!
//! ```text
//! dev, stage, prod
//! ```
//!
//! A comma-separated list, lowest environment first. Entries are trimmed.
//! The registry is built once from that text and never mutated; callers pass
//! it by reference to whatever needs it.

use std::path::Path;

use crate::error::RegistryError;
use crate::types::EnvName;

/// Environment list used when nothing is configured.
pub const DEFAULT_ENVIRONMENTS: &str = "dev, stage, prod";

/// The ordered sequence of known deployment environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    envs: Vec<EnvName>,
}

impl Registry {
    /// Parse a comma-separated environment list.
    ///
    /// Returns `RegistryError::Configuration` when the list is empty, has an
    /// empty entry, repeats a name, or names something that cannot be a
    /// directory segment.
    pub fn parse(source: &str) -> Result<Self, RegistryError> {
        let malformed = |reason: String| RegistryError::Configuration {
            source_text: source.to_string(),
            reason,
        };

        if source.trim().is_empty() {
            return Err(malformed("no environments listed".to_string()));
        }

        let mut envs: Vec<EnvName> = Vec::new();
        for (idx, raw) in source.split(',').enumerate() {
            let name = raw.trim();
            if name.is_empty() {
                return Err(malformed(format!("entry {} is empty", idx + 1)));
            }
            if name.contains(['/', '\\']) {
                return Err(malformed(format!("'{name}' contains a path separator")));
            }
            if envs.iter().any(|e| e == name) {
                return Err(malformed(format!("'{name}' is listed more than once")));
            }
            envs.push(EnvName::from(name));
        }

        Ok(Self { envs })
    }

    /// All known environments, lowest first.
    pub fn known_environments(&self) -> &[EnvName] {
        &self.envs
    }

    /// Index of `name` in the ordered sequence.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.envs.iter().position(|e| e == name)
    }

    /// The environment immediately below `name`.
    ///
    /// `stage` → `dev` for the default registry. Fails with
    /// `UnknownEnvironment` for unregistered names and `Boundary` for the
    /// lowest environment.
    pub fn lower_environment(&self, name: &str) -> Result<&EnvName, RegistryError> {
        match self.position(name) {
            None => Err(self.unknown(name)),
            Some(0) => Err(RegistryError::Boundary {
                name: EnvName::from(name),
            }),
            Some(idx) => Ok(&self.envs[idx - 1]),
        }
    }

    /// Resolve a directory segment (`prod` or `prod-us-east-1`) to its environment.
    ///
    /// An exact match wins; otherwise the text before the first `-` is tried.
    pub fn environment_for_segment(&self, segment: &str) -> Result<&EnvName, RegistryError> {
        if let Some(idx) = self.position(segment) {
            return Ok(&self.envs[idx]);
        }
        let head = segment.split('-').next().unwrap_or(segment);
        self.position(head)
            .map(|idx| &self.envs[idx])
            .ok_or_else(|| self.unknown(segment))
    }

    /// Whether the final segment of `path` names a known environment.
    ///
    /// Pure string check; the path does not need to exist.
    pub fn is_valid_environment_path(&self, path: &Path) -> bool {
        final_segment(path)
            .map(|segment| self.environment_for_segment(&segment).is_ok())
            .unwrap_or(false)
    }

    fn unknown(&self, name: &str) -> RegistryError {
        RegistryError::UnknownEnvironment {
            name: name.to_string(),
            known: self.envs.clone(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            envs: ["dev", "stage", "prod"].into_iter().map(EnvName::from).collect(),
        }
    }
}

/// Last normal component of `path`, ignoring trailing separators and `.`.
pub fn final_segment(path: &Path) -> Option<String> {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part),
            _ => None,
        })
        .last()
        .map(|part| part.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
