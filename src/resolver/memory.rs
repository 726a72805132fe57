use serde::Serialize;

use super::{
    MvcViewResolver, MvcViewResolverSettings, TemplateViewResolver, VelocityViewResolver,
    ViewResolver, LOWEST_PRECEDENCE,
};
use crate::error::BoxError;

/// In-memory view resolver
///
/// Supports every capability and simply records what it was given. Used by
/// tests and by the CLI to show the outcome of applying settings.
/// Starts out with the resolver-side defaults: caching on, macro helpers
/// exposed, lowest precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryViewResolver {
    pub name: String,
    pub prefix: String,
    pub suffix: String,
    pub cache: bool,
    pub content_type: Option<String>,
    pub view_names: Option<Vec<String>>,
    pub expose_request_attributes: bool,
    pub allow_request_override: bool,
    pub allow_session_override: bool,
    pub expose_session_attributes: bool,
    pub expose_spring_macro_helpers: bool,
    pub request_context_attribute: Option<String>,
    pub order: i32,
    pub toolbox_config_location: Option<String>,
    pub date_tool_attribute: Option<String>,
    pub number_tool_attribute: Option<String>,
    /// When set, the MVC integration rejects settings with this message
    #[serde(skip)]
    mvc_failure: Option<String>,
}

impl Default for InMemoryViewResolver {
    fn default() -> Self {
        Self::new("inMemoryViewResolver")
    }
}

impl InMemoryViewResolver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            suffix: String::new(),
            cache: true,
            content_type: None,
            view_names: None,
            expose_request_attributes: false,
            allow_request_override: false,
            allow_session_override: false,
            expose_session_attributes: false,
            expose_spring_macro_helpers: true,
            request_context_attribute: None,
            order: LOWEST_PRECEDENCE,
            toolbox_config_location: None,
            date_tool_attribute: None,
            number_tool_attribute: None,
            mvc_failure: None,
        }
    }

    /// Make [`MvcViewResolver::configure`] fail with the given message
    pub fn with_mvc_failure(mut self, message: impl Into<String>) -> Self {
        self.mvc_failure = Some(message.into());
        self
    }
}

impl ViewResolver for InMemoryViewResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_velocity_view_resolver(&mut self) -> Option<&mut dyn VelocityViewResolver> {
        Some(self)
    }

    fn as_mvc_view_resolver(&mut self) -> Option<&mut dyn MvcViewResolver> {
        Some(self)
    }
}

impl TemplateViewResolver for InMemoryViewResolver {
    fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }

    fn set_suffix(&mut self, suffix: &str) {
        self.suffix = suffix.to_string();
    }

    fn set_cache(&mut self, cache: bool) {
        self.cache = cache;
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    fn set_view_names(&mut self, view_names: Option<&[String]>) {
        self.view_names = view_names.map(<[String]>::to_vec);
    }

    fn set_expose_request_attributes(&mut self, expose: bool) {
        self.expose_request_attributes = expose;
    }

    fn set_allow_request_override(&mut self, allow: bool) {
        self.allow_request_override = allow;
    }

    fn set_allow_session_override(&mut self, allow: bool) {
        self.allow_session_override = allow;
    }

    fn set_expose_session_attributes(&mut self, expose: bool) {
        self.expose_session_attributes = expose;
    }

    fn set_expose_spring_macro_helpers(&mut self, expose: bool) {
        self.expose_spring_macro_helpers = expose;
    }

    fn set_request_context_attribute(&mut self, attribute: Option<&str>) {
        self.request_context_attribute = attribute.map(str::to_string);
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

impl VelocityViewResolver for InMemoryViewResolver {
    fn set_toolbox_config_location(&mut self, location: Option<&str>) {
        self.toolbox_config_location = location.map(str::to_string);
    }

    fn set_date_tool_attribute(&mut self, attribute: Option<&str>) {
        self.date_tool_attribute = attribute.map(str::to_string);
    }

    fn set_number_tool_attribute(&mut self, attribute: Option<&str>) {
        self.number_tool_attribute = attribute.map(str::to_string);
    }
}

impl MvcViewResolver for InMemoryViewResolver {
    fn configure(&mut self, settings: &MvcViewResolverSettings) -> Result<(), BoxError> {
        if let Some(message) = &self.mvc_failure {
            return Err(message.clone().into());
        }

        self.prefix = settings.prefix.clone();
        self.suffix = settings.suffix.clone();
        self.cache = settings.cache;
        if let Some(content_type) = &settings.content_type {
            self.content_type = Some(content_type.clone());
        }
        self.view_names = settings.view_names.clone();
        self.expose_request_attributes = settings.expose_request_attributes;
        self.allow_request_override = settings.allow_request_override;
        self.allow_session_override = settings.allow_session_override;
        self.expose_session_attributes = settings.expose_session_attributes;
        self.expose_spring_macro_helpers = settings.expose_spring_macro_helpers;
        self.request_context_attribute = settings.request_context_attribute.clone();
        self.order = settings.order;
        Ok(())
    }
}
