use std::borrow::Cow;
use std::sync::Arc;

use http::request::Parts;

use crate::attributes::Attribute;
use crate::descriptor::{ControllerDescriptor, IndexedSequence};
use crate::error::VersioningError;
use crate::filters::{FilterInfo, FilterScope};
use crate::options::VersioningOptions;
use crate::reader::{default_reader, requested_api_version, ApiVersionReader};
use crate::version::ApiVersion;

/// The version-specific descriptors of one logical controller.
///
/// The group is itself a [`ControllerDescriptor`]: creating a controller
/// picks the first member declaring the requested API version and falls
/// back to the first member when the request names no version or a version
/// nobody declares. Attributes and filters are the de-duplicated union of
/// the members'.
///
/// It is also an [`IndexedSequence`] over its members, in the order given at
/// construction. The member list is immutable and shared between clones.
pub struct DescriptorGroup<D> {
    name: String,
    options: Option<Arc<VersioningOptions>>,
    reader: Arc<dyn ApiVersionReader>,
    descriptors: Arc<[D]>,
}

impl<D: ControllerDescriptor> DescriptorGroup<D> {
    /// Build a group from a non-empty, ordered list of descriptors.
    ///
    /// `descriptors` may be a `Vec`, an array, or an already shared
    /// `Arc<[D]>`, which is kept as is. When `options` is given, the
    /// version sources it configures are used; otherwise the query string
    /// and header `api-version` are read.
    pub fn new(
        name: impl Into<String>,
        options: Option<Arc<VersioningOptions>>,
        descriptors: impl Into<Arc<[D]>>,
    ) -> Result<Self, VersioningError> {
        let name = name.into();
        let descriptors = descriptors.into();

        if descriptors.is_empty() {
            return Err(VersioningError::InvalidArgument(format!(
                "descriptor group '{name}' requires at least one descriptor"
            )));
        }
        if name.trim().is_empty() {
            return Err(VersioningError::InvalidArgument(
                "descriptor group requires a controller name".into(),
            ));
        }

        let reader: Arc<dyn ApiVersionReader> = match &options {
            Some(options) => Arc::new(options.reader()?),
            None => Arc::new(default_reader()),
        };

        tracing::debug!(controller = %name, members = descriptors.len(), "descriptor group built");

        Ok(Self {
            name,
            options,
            reader,
            descriptors,
        })
    }

    /// Build a group named after its first descriptor.
    pub fn from_descriptors(descriptors: impl Into<Arc<[D]>>) -> Result<Self, VersioningError> {
        let descriptors = descriptors.into();
        let name = descriptors
            .first()
            .map(|d| d.controller_name().to_string())
            .ok_or_else(|| {
                VersioningError::InvalidArgument(
                    "descriptor group requires at least one descriptor".into(),
                )
            })?;
        Self::new(name, None, descriptors)
    }

    /// Replace the source of the requested API version.
    pub fn with_reader(mut self, reader: impl ApiVersionReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    pub fn options(&self) -> Option<&VersioningOptions> {
        self.options.as_deref()
    }

    /// The fallback member, served when no version matches.
    pub fn default_descriptor(&self) -> &D {
        &self.descriptors[0]
    }

    /// The shared member list.
    pub fn descriptors(&self) -> &Arc<[D]> {
        &self.descriptors
    }

    /// Pick the member that should serve `request`.
    pub fn select(&self, request: &Parts) -> Result<&D, VersioningError> {
        let default = self.default_descriptor();
        if self.descriptors.len() == 1 {
            return Ok(default);
        }

        let Some(requested) = self.requested_version(request)? else {
            tracing::debug!(controller = %self.name, "no api version requested, using default descriptor");
            return Ok(default);
        };

        match self.descriptors.iter().position(|d| d.supports(&requested)) {
            Some(index) => {
                tracing::debug!(controller = %self.name, requested = %requested, selected = index, "descriptor selected");
                Ok(&self.descriptors[index])
            }
            None => {
                tracing::warn!(controller = %self.name, requested = %requested, "no descriptor declares the requested api version, using default descriptor");
                Ok(default)
            }
        }
    }

    fn requested_version(&self, request: &Parts) -> Result<Option<ApiVersion>, VersioningError> {
        let requested = requested_api_version(request, self.reader.as_ref())?;
        if requested.is_some() {
            return Ok(requested);
        }
        Ok(self
            .options
            .as_deref()
            .filter(|o| o.assume_default_version_when_unspecified)
            .map(|o| o.default_version.clone()))
    }
}

impl<D: ControllerDescriptor> ControllerDescriptor for DescriptorGroup<D> {
    type Controller = D::Controller;

    fn controller_name(&self) -> &str {
        &self.name
    }

    fn create_controller(&self, request: &Parts) -> Result<Self::Controller, VersioningError> {
        self.select(request)?.create_controller(request)
    }

    fn declared_versions(&self) -> Cow<'_, [ApiVersion]> {
        Cow::Owned(crate::distinct(
            self.descriptors
                .iter()
                .flat_map(|d| d.declared_versions().into_owned()),
        ))
    }

    fn custom_attributes<T: Attribute>(&self, inherit: bool) -> Vec<T> {
        crate::distinct(
            self.descriptors
                .iter()
                .flat_map(|d| d.custom_attributes::<T>(inherit)),
        )
    }

    /// Union of the members' filters. A filter that does not
    /// [`allow_multiple`](crate::Filter::allow_multiple) keeps only its first
    /// instance per name and scope.
    fn filters(&self) -> Vec<FilterInfo> {
        let mut single: Vec<(String, FilterScope)> = Vec::new();
        crate::distinct(self.descriptors.iter().flat_map(|d| d.filters()))
            .into_iter()
            .filter(|info| {
                if info.filter().allow_multiple() {
                    return true;
                }
                let key = (info.name().to_string(), info.scope());
                if single.contains(&key) {
                    return false;
                }
                single.push(key);
                true
            })
            .collect()
    }

    fn supports(&self, version: &ApiVersion) -> bool {
        self.descriptors.iter().any(|d| d.supports(version))
    }
}

impl<D> IndexedSequence for DescriptorGroup<D> {
    type Item = D;

    fn len(&self) -> usize {
        self.descriptors.len()
    }

    fn get(&self, index: usize) -> Result<&D, VersioningError> {
        self.descriptors
            .get(index)
            .ok_or(VersioningError::IndexOutOfRange {
                index: index as i128,
                len: self.descriptors.len(),
            })
    }

    fn iter(&self) -> std::slice::Iter<'_, D> {
        self.descriptors.iter()
    }
}

impl<'a, D> IntoIterator for &'a DescriptorGroup<D> {
    type Item = &'a D;
    type IntoIter = std::slice::Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

impl<D> Clone for DescriptorGroup<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            options: self.options.clone(),
            reader: self.reader.clone(),
            descriptors: self.descriptors.clone(),
        }
    }
}

impl<D> std::fmt::Debug for DescriptorGroup<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorGroup")
            .field("name", &self.name)
            .field("members", &self.descriptors.len())
            .field("options", &self.options)
            .finish()
    }
}
