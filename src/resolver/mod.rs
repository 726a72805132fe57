/// View resolver capabilities
///
/// This module contains the traits a view resolver implements to receive
/// template settings, plus the ordering constants and the selection between
/// the two supported integration surfaces.

pub mod memory;

use crate::error::BoxError;

/// Order value with the highest priority
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;

/// Order value with the lowest priority
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// Order given to template view resolvers so they act as near-last fallbacks
pub const VIEW_RESOLVER_ORDER: i32 = LOWEST_PRECEDENCE - 5;

/// A view resolver registered with the host
///
/// Capabilities are discovered through the `as_*` accessors. A resolver that
/// returns `None` for a capability cannot be configured through it.
pub trait ViewResolver {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Access to the Velocity setter surface, if supported
    fn as_velocity_view_resolver(&mut self) -> Option<&mut dyn VelocityViewResolver> {
        None
    }

    /// Access to the MVC integration surface, if supported
    fn as_mvc_view_resolver(&mut self) -> Option<&mut dyn MvcViewResolver> {
        None
    }
}

/// Setter surface shared by every template view resolver
pub trait TemplateViewResolver {
    fn set_prefix(&mut self, prefix: &str);
    fn set_suffix(&mut self, suffix: &str);
    fn set_cache(&mut self, cache: bool);
    fn set_content_type(&mut self, content_type: &str);
    fn set_view_names(&mut self, view_names: Option<&[String]>);
    fn set_expose_request_attributes(&mut self, expose: bool);
    fn set_allow_request_override(&mut self, allow: bool);
    fn set_allow_session_override(&mut self, allow: bool);
    fn set_expose_session_attributes(&mut self, expose: bool);
    fn set_expose_spring_macro_helpers(&mut self, expose: bool);
    fn set_request_context_attribute(&mut self, attribute: Option<&str>);
    fn set_order(&mut self, order: i32);
}

/// Setter surface of a Velocity view resolver
pub trait VelocityViewResolver: TemplateViewResolver {
    fn set_toolbox_config_location(&mut self, location: Option<&str>);
    fn set_date_tool_attribute(&mut self, attribute: Option<&str>);
    fn set_number_tool_attribute(&mut self, attribute: Option<&str>);
}

/// Settings handed over in one call by the MVC integration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MvcViewResolverSettings {
    pub prefix: String,
    pub suffix: String,
    pub cache: bool,
    /// Content type including the charset parameter, `None` to keep the resolver's own
    pub content_type: Option<String>,
    pub view_names: Option<Vec<String>>,
    pub expose_request_attributes: bool,
    pub allow_request_override: bool,
    pub allow_session_override: bool,
    pub expose_session_attributes: bool,
    pub expose_spring_macro_helpers: bool,
    pub request_context_attribute: Option<String>,
    pub order: i32,
}

/// The newer integration surface: settings are applied in a single fallible call
pub trait MvcViewResolver {
    fn configure(&mut self, settings: &MvcViewResolverSettings) -> Result<(), BoxError>;
}

/// Which integration surface base template settings are applied through
///
/// The default is fixed at build time: `Mvc` when the `mvc` cargo feature is
/// enabled, `Legacy` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverIntegration {
    /// Copy each setting through [`TemplateViewResolver`]
    Legacy,
    /// Delegate to [`MvcViewResolver::configure`]
    Mvc,
}

impl Default for ResolverIntegration {
    fn default() -> Self {
        if cfg!(feature = "mvc") {
            Self::Mvc
        } else {
            Self::Legacy
        }
    }
}
