//! Multi-view dataset descriptor consumed by the registration engine.

mod builder;
mod storage;
pub mod xml;

pub use builder::{build_descriptor, DatasetDescriptor, DescriptorOptions};
pub use storage::{is_remote_uri, resolve_storage_root, PathMode};
