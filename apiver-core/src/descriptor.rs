use std::borrow::Cow;
use std::sync::Arc;

use http::request::Parts;

use crate::attributes::Attribute;
use crate::error::VersioningError;
use crate::filters::FilterInfo;
use crate::version::ApiVersion;

/// Describes one controller implementation: how to create it, which API
/// versions it serves, and the metadata attached to it.
///
/// Implemented by the framework for each concrete controller, and by
/// [`DescriptorGroup`](crate::group::DescriptorGroup) so that a group can be
/// used wherever a single descriptor is expected.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `ControllerDescriptor`",
    label = "this type cannot be grouped by API version",
    note = "implement `ControllerDescriptor` for your descriptor type, or use `StaticDescriptor`"
)]
pub trait ControllerDescriptor {
    type Controller;

    /// Logical controller name shared by every version of the controller.
    fn controller_name(&self) -> &str;

    /// Produce a live controller for the request.
    fn create_controller(&self, request: &Parts) -> Result<Self::Controller, VersioningError>;

    /// API versions this descriptor implements.
    fn declared_versions(&self) -> Cow<'_, [ApiVersion]>;

    /// Attributes of type `T`, including inherited ones when `inherit` is true.
    fn custom_attributes<T: Attribute>(&self, inherit: bool) -> Vec<T>;

    fn filters(&self) -> Vec<FilterInfo>;

    fn supports(&self, version: &ApiVersion) -> bool {
        self.declared_versions().contains(version)
    }
}

impl<D: ControllerDescriptor + ?Sized> ControllerDescriptor for Arc<D> {
    type Controller = D::Controller;

    fn controller_name(&self) -> &str {
        (**self).controller_name()
    }

    fn create_controller(&self, request: &Parts) -> Result<Self::Controller, VersioningError> {
        (**self).create_controller(request)
    }

    fn declared_versions(&self) -> Cow<'_, [ApiVersion]> {
        (**self).declared_versions()
    }

    fn custom_attributes<T: Attribute>(&self, inherit: bool) -> Vec<T> {
        (**self).custom_attributes(inherit)
    }

    fn filters(&self) -> Vec<FilterInfo> {
        (**self).filters()
    }

    fn supports(&self, version: &ApiVersion) -> bool {
        (**self).supports(version)
    }
}

/// Read-only, bounds-checked positional access plus restartable iteration.
pub trait IndexedSequence {
    type Item;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with `IndexOutOfRange` when `index >= len()`.
    fn get(&self, index: usize) -> Result<&Self::Item, VersioningError>;

    /// Signed variant of [`get`](Self::get); negative indices are out of range.
    fn get_signed(&self, index: isize) -> Result<&Self::Item, VersioningError> {
        match usize::try_from(index) {
            Ok(index) => self.get(index),
            Err(_) => Err(VersioningError::IndexOutOfRange {
                index: index as i128,
                len: self.len(),
            }),
        }
    }

    fn iter(&self) -> std::slice::Iter<'_, Self::Item>;
}

type Factory<C> = Arc<dyn Fn(&Parts) -> Result<C, VersioningError> + Send + Sync>;

/// A descriptor assembled from plain values and a controller factory.
///
/// Its declared versions are the explicit ones passed to
/// [`with_versions`](Self::with_versions) followed by those found in
/// [`ApiVersionAttribute`](crate::attributes::ApiVersionAttribute)s.
pub struct StaticDescriptor<C> {
    name: String,
    versions: Vec<ApiVersion>,
    attributes: crate::attributes::AttributeSet,
    filters: Vec<FilterInfo>,
    factory: Factory<C>,
}

impl<C> StaticDescriptor<C> {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Parts) -> Result<C, VersioningError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            versions: Vec::new(),
            attributes: crate::attributes::AttributeSet::new(),
            filters: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    pub fn with_versions(mut self, versions: impl IntoIterator<Item = ApiVersion>) -> Self {
        self.versions.extend(versions);
        self.versions = crate::distinct(std::mem::take(&mut self.versions));
        self
    }

    pub fn with_attributes(mut self, attributes: crate::attributes::AttributeSet) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_filter(mut self, filter: FilterInfo) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn attributes(&self) -> &crate::attributes::AttributeSet {
        &self.attributes
    }
}

impl<C> ControllerDescriptor for StaticDescriptor<C> {
    type Controller = C;

    fn controller_name(&self) -> &str {
        &self.name
    }

    fn create_controller(&self, request: &Parts) -> Result<C, VersioningError> {
        (self.factory)(request)
    }

    fn declared_versions(&self) -> Cow<'_, [ApiVersion]> {
        let from_attributes = self.attributes.api_versions();
        if from_attributes.is_empty() {
            return Cow::Borrowed(&self.versions);
        }
        Cow::Owned(crate::distinct(
            self.versions.iter().cloned().chain(from_attributes),
        ))
    }

    fn custom_attributes<T: Attribute>(&self, inherit: bool) -> Vec<T> {
        self.attributes.get(inherit)
    }

    fn filters(&self) -> Vec<FilterInfo> {
        self.filters.clone()
    }
}

impl<C> std::fmt::Debug for StaticDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticDescriptor")
            .field("name", &self.name)
            .field("versions", &self.versions)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}
