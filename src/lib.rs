/// velocity-config - Velocity view resolver settings
///
/// This library binds externally supplied settings for the Velocity template
/// engine and applies them to a view resolver through its capability traits.

pub mod config;
pub mod error;
pub mod resolver;

// Re-export commonly used types
pub use config::{TemplateViewResolverProperties, VelocityProperties};
pub use error::{ConfigError, Result};
pub use resolver::{
    MvcViewResolver, ResolverIntegration, TemplateViewResolver, VelocityViewResolver,
    ViewResolver, VIEW_RESOLVER_ORDER,
};
