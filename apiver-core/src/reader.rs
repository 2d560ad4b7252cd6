//! Extraction of the requested API version from an inbound request.
//!
//! Readers only collect raw candidate values; [`requested_api_version`]
//! reconciles them into a single [`ApiVersion`].

use std::sync::Arc;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::request::Parts;
use http::HeaderName;

use crate::error::VersioningError;
use crate::version::{ApiVersion, RequestedApiVersion};

/// Default query parameter and header name.
pub const DEFAULT_PARAMETER: &str = "api-version";

/// Default media type parameter (`Accept: application/json; v=2.0`).
pub const DEFAULT_MEDIA_TYPE_PARAMETER: &str = "v";

/// Source of raw API version values in a request.
pub trait ApiVersionReader: Send + Sync {
    /// Raw candidate values in source order. Empty when the request does not
    /// specify a version.
    fn read(&self, parts: &Parts) -> Vec<String>;
}

impl<R: ApiVersionReader + ?Sized> ApiVersionReader for Arc<R> {
    fn read(&self, parts: &Parts) -> Vec<String> {
        (**self).read(parts)
    }
}

impl<R: ApiVersionReader + ?Sized> ApiVersionReader for Box<R> {
    fn read(&self, parts: &Parts) -> Vec<String> {
        (**self).read(parts)
    }
}

/// Reads `?api-version=...` (parameter name matched case-insensitively).
#[derive(Debug, Clone)]
pub struct QueryStringReader {
    parameter: String,
}

impl QueryStringReader {
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
        }
    }
}

impl Default for QueryStringReader {
    fn default() -> Self {
        Self::new(DEFAULT_PARAMETER)
    }
}

impl ApiVersionReader for QueryStringReader {
    fn read(&self, parts: &Parts) -> Vec<String> {
        let Some(query) = parts.uri.query() else {
            return Vec::new();
        };
        form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key.eq_ignore_ascii_case(&self.parameter))
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// Reads one or more request headers. Comma-separated values are split.
#[derive(Debug, Clone)]
pub struct HeaderReader {
    headers: Vec<HeaderName>,
}

impl HeaderReader {
    /// Fails with `InvalidArgument` when no header is given or a name is not
    /// a valid header name.
    pub fn new<I, S>(headers: I) -> Result<Self, VersioningError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers = headers
            .into_iter()
            .map(|name| {
                HeaderName::from_bytes(name.as_ref().as_bytes()).map_err(|_| {
                    VersioningError::InvalidArgument(format!(
                        "'{}' is not a valid header name",
                        name.as_ref()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if headers.is_empty() {
            return Err(VersioningError::InvalidArgument(
                "HeaderReader requires at least one header name".into(),
            ));
        }
        Ok(Self { headers })
    }
}

impl Default for HeaderReader {
    fn default() -> Self {
        Self {
            headers: vec![HeaderName::from_static(DEFAULT_PARAMETER)],
        }
    }
}

impl ApiVersionReader for HeaderReader {
    fn read(&self, parts: &Parts) -> Vec<String> {
        self.headers
            .iter()
            .flat_map(|name| parts.headers.get_all(name))
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Reads a media type parameter from `Accept` and `Content-Type`.
#[derive(Debug, Clone)]
pub struct MediaTypeReader {
    parameter: String,
}

impl MediaTypeReader {
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
        }
    }
}

impl Default for MediaTypeReader {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_TYPE_PARAMETER)
    }
}

impl ApiVersionReader for MediaTypeReader {
    fn read(&self, parts: &Parts) -> Vec<String> {
        [ACCEPT, CONTENT_TYPE]
            .iter()
            .flat_map(|name| parts.headers.get_all(name))
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .flat_map(|media_type| media_type.split(';').skip(1))
            .filter_map(|param| param.split_once('='))
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case(&self.parameter))
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// Concatenates the values of several readers, in reader order.
#[derive(Clone, Default)]
pub struct CombinedReader {
    readers: Vec<Arc<dyn ApiVersionReader>>,
}

impl CombinedReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reader: impl ApiVersionReader + 'static) -> Self {
        self.readers.push(Arc::new(reader));
        self
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl ApiVersionReader for CombinedReader {
    fn read(&self, parts: &Parts) -> Vec<String> {
        self.readers.iter().flat_map(|r| r.read(parts)).collect()
    }
}

impl std::fmt::Debug for CombinedReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReader")
            .field("readers", &self.readers.len())
            .finish()
    }
}

/// Query string `api-version` combined with the `api-version` header.
pub fn default_reader() -> CombinedReader {
    CombinedReader::new()
        .with(QueryStringReader::default())
        .with(HeaderReader::default())
}

/// Resolve the API version a request asks for.
///
/// A [`RequestedApiVersion`] already stored in the request extensions wins.
/// Otherwise the reader's candidates are de-duplicated by parsed version
/// (`2` and `2.0` are one candidate), and text that does not parse is
/// compared case-insensitively. No candidate yields `Ok(None)`, several
/// distinct candidates fail with `AmbiguousApiVersion`, and a single value
/// that does not parse yields `Ok(None)`.
pub fn requested_api_version(
    parts: &Parts,
    reader: &dyn ApiVersionReader,
) -> Result<Option<ApiVersion>, VersioningError> {
    if let Some(RequestedApiVersion(resolved)) = parts.extensions.get::<RequestedApiVersion>() {
        return Ok(resolved.clone());
    }

    let mut candidates: Vec<(String, Option<ApiVersion>)> = Vec::new();
    for raw in reader.read(parts) {
        let parsed = raw.parse::<ApiVersion>().ok();
        let seen = candidates.iter().any(|(seen_raw, seen_parsed)| match (&parsed, seen_parsed) {
            (Some(version), Some(seen_version)) => version == seen_version,
            (None, None) => seen_raw.eq_ignore_ascii_case(&raw),
            _ => false,
        });
        if !seen {
            candidates.push((raw, parsed));
        }
    }

    match candidates.len() {
        0 => Ok(None),
        1 => {
            let (raw, parsed) = candidates.remove(0);
            if parsed.is_none() {
                tracing::debug!(raw = %raw, "ignoring unparseable api version");
            }
            Ok(parsed)
        }
        _ => Err(VersioningError::AmbiguousApiVersion(
            candidates.into_iter().map(|(raw, _)| raw).collect(),
        )),
    }
}
