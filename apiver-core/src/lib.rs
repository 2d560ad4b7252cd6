pub mod attributes;
pub mod catalog;
pub mod dedup;
pub mod descriptor;
pub mod error;
pub mod filters;
pub mod group;
pub mod options;
pub mod reader;
pub mod version;

pub use attributes::{ApiVersionAttribute, Attribute, AttributeSet};
pub use catalog::ControllerCatalog;
pub use dedup::distinct;
pub use descriptor::{ControllerDescriptor, IndexedSequence, StaticDescriptor};
pub use error::{error_response, VersioningError};
pub use filters::{Filter, FilterInfo, FilterScope};
pub use group::DescriptorGroup;
pub use options::VersioningOptions;
pub use reader::{
    default_reader, requested_api_version, ApiVersionReader, CombinedReader, HeaderReader,
    MediaTypeReader, QueryStringReader,
};
pub use version::{ApiVersion, RequestedApiVersion};
