use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::ControllerDescriptor;
use crate::error::VersioningError;
use crate::group::DescriptorGroup;
use crate::options::VersioningOptions;

/// Descriptor groups keyed by controller name.
///
/// Built once from every descriptor the application registers: descriptors
/// sharing a controller name (compared case-insensitively) become one
/// [`DescriptorGroup`], in registration order. The first spelling seen names
/// the group.
pub struct ControllerCatalog<D> {
    groups: Vec<DescriptorGroup<D>>,
    index: HashMap<String, usize>,
}

impl<D: ControllerDescriptor> ControllerCatalog<D> {
    pub fn build(
        descriptors: impl IntoIterator<Item = D>,
        options: Option<Arc<VersioningOptions>>,
    ) -> Result<Self, VersioningError> {
        let mut buckets: Vec<(String, Vec<D>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for descriptor in descriptors {
            let key = descriptor.controller_name().to_lowercase();
            match index.get(&key).copied() {
                Some(slot) => buckets[slot].1.push(descriptor),
                None => {
                    let name = descriptor.controller_name().to_string();
                    index.insert(key, buckets.len());
                    buckets.push((name, vec![descriptor]));
                }
            }
        }

        let groups = buckets
            .into_iter()
            .map(|(name, members)| DescriptorGroup::new(name, options.clone(), members))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(controllers = groups.len(), "controller catalog built");

        Ok(Self { groups, index })
    }

    /// Group for a controller name, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&DescriptorGroup<D>> {
        self.index
            .get(&name.to_lowercase())
            .map(|&slot| &self.groups[slot])
    }

    /// Controller names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.controller_name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DescriptorGroup<D>> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
