//! Formula manifest (`formula-info.json`) loading and validation.
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::error::ValidationError;

/// File name of the manifest inside every formula directory.
pub const MANIFEST_FILE: &str = "formula-info.json";

/// Displayed in place of absent metadata fields.
pub const NOT_FOUND: &str = "Not found.";

const PATH_SCHEMA: &str =
    "`path` should be an object with glob patterns as keys and arrays of path segments as values";

/// One `pattern -> destination` entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    /// Glob pattern relative to the formula directory.
    pub pattern: String,
    /// Destination directory template (see [`super::template`]).
    pub destination: Vec<String>,
}

/// A validated formula manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Path rules in declaration order.
    pub rules: Vec<PathRule>,
    /// Display name.
    pub name: Option<String>,
    /// Version string.
    pub version: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// Project website.
    pub website: Option<String>,
    /// Disabled formulae are listed but never mounted or unmounted.
    pub disabled: bool,
}

/// Raw document shape; `path` is validated by hand for precise messages.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    path: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    disabled: bool,
}

impl Manifest {
    /// Load and validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the file is missing, unreadable, not
    /// JSON, or does not follow the manifest schema.
    pub fn load(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ValidationError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ValidationError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse manifest `content`; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `content` is not JSON or does not
    /// follow the manifest schema.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(content).map_err(|source| ValidationError::MalformedJson {
                path: path.to_path_buf(),
                source,
            })?;

        let schema = |message: String| ValidationError::Schema {
            path: path.to_path_buf(),
            message,
        };

        if !value.is_object() {
            return Err(schema("the manifest should be a JSON object".to_string()));
        }
        let raw: RawManifest = serde_json::from_value(value).map_err(|e| schema(e.to_string()))?;
        let rules = match raw.path {
            None | Some(Value::Null) => Vec::new(),
            Some(path_value) => parse_rules(&path_value).ok_or_else(|| schema(PATH_SCHEMA.to_string()))?,
        };

        Ok(Self {
            rules,
            name: raw.name,
            version: raw.version,
            description: raw.description,
            website: raw.website,
            disabled: raw.disabled,
        })
    }

    /// Metadata as `(label, value)` pairs for display, with absent values
    /// replaced by [`NOT_FOUND`].
    #[must_use]
    pub fn metadata(&self) -> [(&'static str, &str); 4] {
        fn show(value: Option<&str>) -> &str {
            value.unwrap_or(NOT_FOUND)
        }
        [
            ("name", show(self.name.as_deref())),
            ("version", show(self.version.as_deref())),
            ("description", show(self.description.as_deref())),
            ("website", show(self.website.as_deref())),
        ]
    }
}

/// Convert the `path` object into rules, or `None` if it violates the schema.
fn parse_rules(value: &Value) -> Option<Vec<PathRule>> {
    value
        .as_object()?
        .iter()
        .map(|(pattern, segments)| {
            let destination = segments
                .as_array()?
                .iter()
                .map(|s| s.as_str().map(String::from))
                .collect::<Option<Vec<_>>>()?;
            Some(PathRule {
                pattern: pattern.clone(),
                destination,
            })
        })
        .collect()
}
