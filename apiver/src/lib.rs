//! API versioning for controller descriptors.
//!
//! Several implementations of one logical controller, each declaring the API
//! versions it serves, are collected into a [`DescriptorGroup`]. The group is
//! itself a descriptor: it creates the controller of the member matching the
//! version a request asks for, and falls back to its first member otherwise.
//!
//! ```ignore
//! use apiver::prelude::*;
//!
//! let group = DescriptorGroup::new("users", None, vec![
//!     StaticDescriptor::new("users", |_| Ok(UsersV1)).with_versions([ApiVersion::new(1, 0)]),
//!     StaticDescriptor::new("users", |_| Ok(UsersV2)).with_versions([ApiVersion::new(2, 0)]),
//! ])?;
//!
//! let controller = group.create_controller(&parts)?;
//! ```

mod layers;

pub use apiver_core::*;
pub use layers::init_tracing;

pub mod prelude {
    //! Import everything you need with a single `use`.
    pub use apiver_core::{
        ApiVersion, ApiVersionAttribute, ApiVersionReader, AttributeSet, ControllerCatalog,
        ControllerDescriptor, DescriptorGroup, Filter, FilterInfo, FilterScope, IndexedSequence,
        RequestedApiVersion, StaticDescriptor, VersioningError, VersioningOptions,
    };
    pub use crate::init_tracing;
}
