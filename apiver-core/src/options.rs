use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VersioningError;
use crate::reader::{
    CombinedReader, HeaderReader, MediaTypeReader, QueryStringReader, DEFAULT_PARAMETER,
};
use crate::version::ApiVersion;

/// YAML section holding the options.
pub const SECTION: &str = "versioning";

/// Environment variable overriding `versioning.default_version` in [`VersioningOptions::load`].
pub const DEFAULT_VERSION_ENV: &str = "APIVER_DEFAULT_VERSION";

/// Versioning options, read from the `versioning:` section of an
/// `application.yaml`-style document.
///
/// ```yaml
/// versioning:
///   default_version: "1.0"
///   assume_default_version_when_unspecified: false
///   query_parameter: api-version
///   headers: [api-version, x-api-version]
///   media_type_parameter: v
/// ```
///
/// Every key is optional. Set `query_parameter: ~` or `headers: []` to turn a
/// source off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningOptions {
    pub default_version: ApiVersion,
    /// When true, a request without a version is served as if it asked for
    /// `default_version`.
    pub assume_default_version_when_unspecified: bool,
    pub query_parameter: Option<String>,
    pub headers: Vec<String>,
    pub media_type_parameter: Option<String>,
}

impl Default for VersioningOptions {
    fn default() -> Self {
        Self {
            default_version: ApiVersion::default(),
            assume_default_version_when_unspecified: false,
            query_parameter: Some(DEFAULT_PARAMETER.to_string()),
            headers: vec![DEFAULT_PARAMETER.to_string()],
            media_type_parameter: None,
        }
    }
}

impl VersioningOptions {
    /// Parse the `versioning:` section of a YAML document. A document without
    /// that section yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, VersioningError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let options = match doc.get(SECTION) {
            None | Some(serde_yaml::Value::Null) => Self::default(),
            Some(section) => serde_yaml::from_value(section.clone())?,
        };
        options.validate()?;
        Ok(options)
    }

    /// Load from a YAML file, then apply the `APIVER_DEFAULT_VERSION`
    /// override. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VersioningError> {
        let path = path.as_ref();
        let mut options = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "no versioning config file, using defaults");
            Self::default()
        };

        if let Ok(raw) = std::env::var(DEFAULT_VERSION_ENV) {
            options.default_version = raw.parse().map_err(|_| {
                VersioningError::Config(format!(
                    "{DEFAULT_VERSION_ENV} is not an API version: '{raw}'"
                ))
            })?;
        }
        Ok(options)
    }

    /// Check that at least one version source is configured and that every
    /// configured name is usable.
    pub fn validate(&self) -> Result<(), VersioningError> {
        if self.query_parameter.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(VersioningError::Config("query_parameter must not be empty".into()));
        }
        if self.media_type_parameter.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(VersioningError::Config("media_type_parameter must not be empty".into()));
        }
        if !self.headers.is_empty() {
            HeaderReader::new(&self.headers).map_err(|e| VersioningError::Config(e.to_string()))?;
        }
        if self.query_parameter.is_none()
            && self.headers.is_empty()
            && self.media_type_parameter.is_none()
        {
            return Err(VersioningError::Config("no API version source is configured".into()));
        }
        Ok(())
    }

    /// Build the reader described by these options: query string, then
    /// headers, then media type parameter.
    pub fn reader(&self) -> Result<CombinedReader, VersioningError> {
        self.validate()?;
        let mut reader = CombinedReader::new();
        if let Some(parameter) = &self.query_parameter {
            reader = reader.with(QueryStringReader::new(parameter.clone()));
        }
        if !self.headers.is_empty() {
            reader = reader.with(HeaderReader::new(&self.headers)?);
        }
        if let Some(parameter) = &self.media_type_parameter {
            reader = reader.with(MediaTypeReader::new(parameter.clone()));
        }
        Ok(reader)
    }
}
