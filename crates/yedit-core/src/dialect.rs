//! # YAML Dialect Revision
//!
//! The dialect decides tag resolution for plain scalars. Only the two
//! revisions in common use are supported; anything else is rejected when
//! the configuration is built rather than silently treated as 1.2.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigurationError;

/// Plain scalars that YAML 1.1 resolves to `true`.
const YAML_1_1_TRUE: &[&str] = &["y", "Y", "yes", "Yes", "YES", "on", "On", "ON"];

/// Plain scalars that YAML 1.1 resolves to `false`.
const YAML_1_1_FALSE: &[&str] = &["n", "N", "no", "No", "NO", "off", "Off", "OFF"];

/// Structured-document dialect revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DialectVersion {
    /// YAML 1.1: `yes`/`no`/`on`/`off` are booleans.
    V1_1,
    /// YAML 1.2 core schema.
    #[default]
    V1_2,
}

impl DialectVersion {
    /// The version string as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
        }
    }

    /// Boolean value of an unquoted scalar under this dialect, beyond the
    /// `true`/`false` spellings every revision shares.
    pub fn extra_boolean(&self, plain: &str) -> Option<bool> {
        match self {
            Self::V1_2 => None,
            Self::V1_1 => {
                if YAML_1_1_TRUE.contains(&plain) {
                    Some(true)
                } else if YAML_1_1_FALSE.contains(&plain) {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }
}

impl FromStr for DialectVersion {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.1" => Ok(Self::V1_1),
            "1.2" => Ok(Self::V1_2),
            other => Err(ConfigurationError::UnsupportedDialect(other.to_string())),
        }
    }
}

impl TryFrom<String> for DialectVersion {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DialectVersion> for String {
    fn from(version: DialectVersion) -> Self {
        version.as_str().to_string()
    }
}

impl std::fmt::Display for DialectVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
