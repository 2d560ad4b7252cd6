use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A filter attached to a controller descriptor.
///
/// The pipeline that runs filters lives outside this crate; descriptors only
/// report which filter instances apply to them.
pub trait Filter: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Whether several instances of this filter may apply to the same action.
    fn allow_multiple(&self) -> bool {
        true
    }
}

/// Where a filter was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterScope {
    Global,
    Controller,
    Action,
}

/// A filter instance together with its scope.
///
/// Two `FilterInfo`s are equal when they share the same filter *instance*
/// and scope, so a filter registered once and reported by several
/// descriptors collapses to a single entry.
#[derive(Clone)]
pub struct FilterInfo {
    filter: Arc<dyn Filter>,
    scope: FilterScope,
}

impl FilterInfo {
    pub fn new(filter: Arc<dyn Filter>, scope: FilterScope) -> Self {
        Self { filter, scope }
    }

    pub fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }

    pub fn scope(&self) -> FilterScope {
        self.scope
    }

    pub fn name(&self) -> &str {
        self.filter.name()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.filter) as *const ()
    }
}

impl PartialEq for FilterInfo {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr() && self.scope == other.scope
    }
}

impl Eq for FilterInfo {}

impl Hash for FilterInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
        self.scope.hash(state);
    }
}

impl fmt::Debug for FilterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterInfo")
            .field("name", &self.filter.name())
            .field("scope", &self.scope)
            .finish()
    }
}
