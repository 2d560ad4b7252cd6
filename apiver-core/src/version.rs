use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VersioningError;

const GROUP_FORMAT: &str = "%Y-%m-%d";

/// An API version.
///
/// Accepted text forms:
///
/// - `major[.minor][-status]`, e.g. `1`, `1.0`, `2.1-beta`
/// - `yyyy-MM-dd[.major[.minor]][-status]`, e.g. `2016-07-01`, `2016-07-01.1.0-rc`
///
/// An omitted minor is equal to minor `0`, so `1` and `1.0` match each other.
/// Status labels compare case-insensitively. A version without a status sorts
/// after the same version with one (`1.0-beta < 1.0`).
#[derive(Debug, Clone)]
pub struct ApiVersion {
    group: Option<NaiveDate>,
    major: Option<u32>,
    minor: Option<u32>,
    status: Option<String>,
}

impl ApiVersion {
    /// `major.minor` version.
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            group: None,
            major: Some(major),
            minor: Some(minor),
            status: None,
        }
    }

    /// Major-only version; the minor is implied to be `0`.
    pub fn major(major: u32) -> Self {
        Self {
            group: None,
            major: Some(major),
            minor: None,
            status: None,
        }
    }

    /// Date-based group version.
    pub fn group(date: NaiveDate) -> Self {
        Self {
            group: Some(date),
            major: None,
            minor: None,
            status: None,
        }
    }

    /// Attach a status label (`alpha`, `beta`, `rc1`...).
    ///
    /// Labels must be non-empty and alphanumeric.
    pub fn with_status(mut self, status: &str) -> Result<Self, VersioningError> {
        if !is_valid_status(status) {
            return Err(VersioningError::InvalidApiVersion(format!("{self}-{status}")));
        }
        self.status = Some(status.to_string());
        Ok(self)
    }

    pub fn group_version(&self) -> Option<NaiveDate> {
        self.group
    }

    pub fn major_version(&self) -> Option<u32> {
        self.major
    }

    pub fn minor_version(&self) -> Option<u32> {
        self.minor
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Parse the text form. Equivalent to `text.parse::<ApiVersion>()`.
    pub fn parse(text: &str) -> Result<Self, VersioningError> {
        text.parse()
    }

    fn implied_major(&self) -> u32 {
        self.major.unwrap_or(0)
    }

    fn implied_minor(&self) -> u32 {
        self.minor.unwrap_or(0)
    }

    fn normalized_status(&self) -> Option<String> {
        self.status.as_ref().map(|s| s.to_ascii_lowercase())
    }
}

impl Default for ApiVersion {
    /// `1.0`, the conventional version of an unversioned API.
    fn default() -> Self {
        ApiVersion::new(1, 0)
    }
}

fn is_valid_status(status: &str) -> bool {
    !status.is_empty() && status.chars().all(|c| c.is_ascii_alphanumeric())
}

fn looks_like_group(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 10 && bytes[4] == b'-' && bytes[7] == b'-'
}

fn parse_number(part: &str, original: &str) -> Result<u32, VersioningError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersioningError::InvalidApiVersion(original.to_string()));
    }
    part.parse()
        .map_err(|_| VersioningError::InvalidApiVersion(original.to_string()))
}

impl FromStr for ApiVersion {
    type Err = VersioningError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let original = text;
        let text = text.trim();
        let invalid = || VersioningError::InvalidApiVersion(original.to_string());

        if text.is_empty() {
            return Err(invalid());
        }

        let (group, rest) = if looks_like_group(text) {
            let head = text.get(..10).ok_or_else(invalid)?;
            let date = NaiveDate::parse_from_str(head, GROUP_FORMAT).map_err(|_| invalid())?;
            (Some(date), &text[10..])
        } else {
            (None, text)
        };

        let (numbers, status) = match rest.split_once('-') {
            Some((numbers, status)) => (numbers, Some(status)),
            None => (rest, None),
        };

        if let Some(status) = status {
            if !is_valid_status(status) {
                return Err(invalid());
            }
        }

        // Group versions separate their optional numeric part with a dot.
        let numbers = match group {
            Some(_) if numbers.is_empty() => None,
            Some(_) => Some(numbers.strip_prefix('.').ok_or_else(invalid)?),
            None => Some(numbers),
        };

        let (major, minor) = match numbers {
            None => (None, None),
            Some(numbers) => {
                let mut parts = numbers.split('.');
                let major = parse_number(parts.next().unwrap_or_default(), original)?;
                let minor = match parts.next() {
                    Some(part) => Some(parse_number(part, original)?),
                    None => None,
                };
                if parts.next().is_some() {
                    return Err(invalid());
                }
                (Some(major), minor)
            }
        };

        Ok(ApiVersion {
            group,
            major,
            minor,
            status: status.map(str::to_string),
        })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group) = self.group {
            write!(f, "{}", group.format(GROUP_FORMAT))?;
        }
        if let Some(major) = self.major {
            if self.group.is_some() {
                f.write_str(".")?;
            }
            write!(f, "{major}")?;
            if let Some(minor) = self.minor {
                write!(f, ".{minor}")?;
            }
        }
        if let Some(status) = &self.status {
            write!(f, "-{status}")?;
        }
        Ok(())
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group
            && self.implied_major() == other.implied_major()
            && self.implied_minor() == other.implied_minor()
            && self.normalized_status() == other.normalized_status()
    }
}

impl Eq for ApiVersion {}

impl Hash for ApiVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.hash(state);
        self.implied_major().hash(state);
        self.implied_minor().hash(state);
        self.normalized_status().hash(state);
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group
            .cmp(&other.group)
            .then_with(|| self.implied_major().cmp(&other.implied_major()))
            .then_with(|| self.implied_minor().cmp(&other.implied_minor()))
            .then_with(|| match (self.normalized_status(), other.normalized_status()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct ApiVersionVisitor;

impl serde::de::Visitor<'_> for ApiVersionVisitor {
    type Value = ApiVersion;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an API version such as \"1.0\" or \"2016-07-01\"")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<ApiVersion, E> {
        v.parse().map_err(E::custom)
    }

    // Unquoted YAML integers such as `2` arrive as numbers.
    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<ApiVersion, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<ApiVersion, E> {
        self.visit_str(&v.to_string())
    }

    // A float has already lost trailing zeros (`1.10` reads as `1.1`).
    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<ApiVersion, E> {
        Err(E::custom(format_args!(
            "API version {v} is a number; quote API versions with a minor part, e.g. \"1.10\""
        )))
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ApiVersionVisitor)
    }
}

/// The API version resolved for a request by an upstream layer.
///
/// When present in the request extensions it takes precedence over any
/// [`ApiVersionReader`](crate::reader::ApiVersionReader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedApiVersion(pub Option<ApiVersion>);
