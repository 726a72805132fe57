/// Configuration types for the Velocity view resolver
///
/// This module contains the settings types and the binder that reads them
/// from documents and flat key/value namespaces.

mod binder;
mod template;
mod velocity;

pub use binder::{apply_pairs, bind_document, bind_pairs, canonical_name, load_file, PREFIX};
pub use template::{TemplateViewResolverProperties, DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE};
pub use velocity::{
    VelocityProperties, DEFAULT_PREFIX, DEFAULT_RESOURCE_LOADER_PATH, DEFAULT_SUFFIX,
};
