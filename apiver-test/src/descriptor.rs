use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use apiver_core::{
    ApiVersion, Attribute, AttributeSet, ControllerDescriptor, Filter, FilterInfo, FilterScope,
    VersioningError,
};
use http::request::Parts;

/// Controller produced by a [`RecordingDescriptor`]: carries the label of the
/// descriptor that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestController {
    pub label: String,
}

/// Descriptor double that records how many controllers it created.
///
/// ```ignore
/// let v1 = RecordingDescriptor::new("users", "v1").versions(["1.0"]);
/// ```
pub struct RecordingDescriptor {
    name: String,
    label: String,
    versions: Vec<ApiVersion>,
    attributes: AttributeSet,
    filters: Vec<FilterInfo>,
    fail_with: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl RecordingDescriptor {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            versions: Vec::new(),
            attributes: AttributeSet::new(),
            filters: Vec::new(),
            fail_with: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Declare versions from their text form. Panics on invalid text.
    pub fn versions<'a>(mut self, versions: impl IntoIterator<Item = &'a str>) -> Self {
        self.versions.extend(
            versions
                .into_iter()
                .map(|v| v.parse::<ApiVersion>().expect("invalid test api version")),
        );
        self
    }

    pub fn attribute<T: Attribute>(mut self, attribute: T) -> Self {
        self.attributes.declare(attribute);
        self
    }

    pub fn inherited_attribute<T: Attribute>(mut self, attribute: T) -> Self {
        self.attributes.inherit(attribute);
        self
    }

    pub fn filter(mut self, filter: FilterInfo) -> Self {
        self.filters.push(filter);
        self
    }

    /// Make `create_controller` fail with `VersioningError::Controller`.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    /// Number of `create_controller` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared call counter, still readable after the descriptor moves into a group.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl ControllerDescriptor for RecordingDescriptor {
    type Controller = TestController;

    fn controller_name(&self) -> &str {
        &self.name
    }

    fn create_controller(&self, _request: &Parts) -> Result<TestController, VersioningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(VersioningError::Controller(message.clone()));
        }
        Ok(TestController {
            label: self.label.clone(),
        })
    }

    fn declared_versions(&self) -> Cow<'_, [ApiVersion]> {
        Cow::Borrowed(&self.versions)
    }

    fn custom_attributes<T: Attribute>(&self, inherit: bool) -> Vec<T> {
        self.attributes.get(inherit)
    }

    fn filters(&self) -> Vec<FilterInfo> {
        self.filters.clone()
    }
}

impl std::fmt::Debug for RecordingDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("versions", &self.versions)
            .field("attributes", &self.attributes)
            .field("filters", &self.filters)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

/// Filter double identified by name.
#[derive(Debug)]
pub struct NamedFilter(pub &'static str);

impl Filter for NamedFilter {
    fn name(&self) -> &str {
        self.0
    }
}

/// Filter double that may apply only once per action.
#[derive(Debug)]
pub struct SingleFilter(pub &'static str);

impl Filter for SingleFilter {
    fn name(&self) -> &str {
        self.0
    }

    fn allow_multiple(&self) -> bool {
        false
    }
}

/// A fresh filter instance wrapped in a `FilterInfo`.
pub fn named_filter(name: &'static str, scope: FilterScope) -> FilterInfo {
    FilterInfo::new(Arc::new(NamedFilter(name)), scope)
}

/// A fresh single-instance filter wrapped in a `FilterInfo`.
pub fn single_filter(name: &'static str, scope: FilterScope) -> FilterInfo {
    FilterInfo::new(Arc::new(SingleFilter(name)), scope)
}
