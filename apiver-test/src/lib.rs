mod descriptor;
mod request;

pub use descriptor::{
    named_filter, single_filter, NamedFilter, RecordingDescriptor, SingleFilter, TestController,
};
pub use request::RequestBuilder;
