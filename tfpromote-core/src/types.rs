//! Domain types shared by every tfpromote crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed deployment environment name (`dev`, `stage`, `prod`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvName(pub String);

impl EnvName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EnvName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EnvName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for EnvName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EnvName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EnvName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which naming convention a configuration file follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// `{name}.tf`: expected to be identical across environments once promoted.
    Plain,
    /// `{segment}-{name}.tf`: intentionally divergent per environment.
    Scoped,
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileCategory::Plain => write!(f, "plain"),
            FileCategory::Scoped => write!(f, "scoped"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(EnvName::from("stage").to_string(), "stage");
    }

    #[test]
    fn newtype_equality() {
        let a = EnvName::from("prod");
        let b = EnvName::from(String::from("prod"));
        assert_eq!(a, b);
        assert!(a == "prod");
    }

    #[test]
    fn env_name_serializes_as_plain_string() {
        let json = serde_json::to_string(&EnvName::from("dev")).expect("serialize");
        assert_eq!(json, "\"dev\"");
    }

    #[test]
    fn file_category_display() {
        assert_eq!(FileCategory::Plain.to_string(), "plain");
        assert_eq!(FileCategory::Scoped.to_string(), "scoped");
    }
}
