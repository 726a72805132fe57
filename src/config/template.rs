use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::resolver::{MvcViewResolverSettings, TemplateViewResolver, ViewResolver, VIEW_RESOLVER_ORDER};

pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Settings shared by every template engine's view resolver
///
/// Engine-specific settings embed this struct by value and supply their own
/// prefix and suffix defaults through [`TemplateViewResolverProperties::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateViewResolverProperties {
    /// Whether MVC view resolution is enabled for this engine
    enabled: bool,

    /// Whether resolved views are cached
    cache: bool,

    /// MIME type written to responses, without the charset parameter
    content_type: Option<String>,

    /// Template encoding
    charset: Option<String>,

    /// View names that can be resolved by this resolver
    #[serde(skip_serializing_if = "Option::is_none")]
    view_names: Option<Vec<String>>,

    /// Whether to check that the templates location exists
    check_template_location: bool,

    /// Prefix prepended to view names when building a template URL
    prefix: String,

    /// Suffix appended to view names when building a template URL
    suffix: String,

    /// Name of the request context attribute exposed to every view
    #[serde(skip_serializing_if = "Option::is_none")]
    request_context_attribute: Option<String>,

    expose_request_attributes: bool,
    expose_session_attributes: bool,
    allow_request_override: bool,
    allow_session_override: bool,

    /// Whether the macro library helpers are exposed as "springMacroRequestContext"
    expose_spring_macro_helpers: bool,
}

impl Default for TemplateViewResolverProperties {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl TemplateViewResolverProperties {
    /// Create base settings with engine-specific prefix and suffix defaults
    pub fn new(default_prefix: impl Into<String>, default_suffix: impl Into<String>) -> Self {
        Self {
            enabled: true,
            cache: false,
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            charset: Some(DEFAULT_CHARSET.to_string()),
            view_names: None,
            check_template_location: true,
            prefix: default_prefix.into(),
            suffix: default_suffix.into(),
            request_context_attribute: None,
            expose_request_attributes: false,
            expose_session_attributes: false,
            allow_request_override: false,
            allow_session_override: false,
            expose_spring_macro_helpers: true,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn cache(&self) -> bool {
        self.cache
    }

    pub fn set_cache(&mut self, cache: bool) {
        self.cache = cache;
    }

    /// The configured MIME type, exactly as set
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: Option<String>) {
        self.content_type = content_type;
    }

    /// The content type handed to resolvers
    ///
    /// Inserts `;charset=<charset>` right after the MIME type unless a
    /// charset parameter is already present.
    ///
    /// # Example
    /// ```
    /// use velocity_config::config::TemplateViewResolverProperties;
    ///
    /// let base = TemplateViewResolverProperties::default();
    /// assert_eq!(
    ///     base.effective_content_type().as_deref(),
    ///     Some("text/html;charset=UTF-8")
    /// );
    /// ```
    pub fn effective_content_type(&self) -> Option<String> {
        let content_type = self.content_type.as_deref()?;
        let Some(charset) = self.charset.as_deref() else {
            return Some(content_type.to_string());
        };
        if has_charset_parameter(content_type) {
            return Some(content_type.to_string());
        }

        match content_type.split_once(';') {
            Some((mime, parameters)) => Some(format!("{};charset={};{}", mime, charset, parameters)),
            None => Some(format!("{};charset={}", content_type, charset)),
        }
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn set_charset(&mut self, charset: Option<String>) {
        self.charset = charset;
    }

    pub fn view_names(&self) -> Option<&[String]> {
        self.view_names.as_deref()
    }

    pub fn set_view_names(&mut self, view_names: Option<Vec<String>>) {
        self.view_names = view_names;
    }

    pub fn check_template_location(&self) -> bool {
        self.check_template_location
    }

    pub fn set_check_template_location(&mut self, check: bool) {
        self.check_template_location = check;
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn set_suffix(&mut self, suffix: impl Into<String>) {
        self.suffix = suffix.into();
    }

    pub fn request_context_attribute(&self) -> Option<&str> {
        self.request_context_attribute.as_deref()
    }

    pub fn set_request_context_attribute(&mut self, attribute: Option<String>) {
        self.request_context_attribute = attribute;
    }

    pub fn expose_request_attributes(&self) -> bool {
        self.expose_request_attributes
    }

    pub fn set_expose_request_attributes(&mut self, expose: bool) {
        self.expose_request_attributes = expose;
    }

    pub fn expose_session_attributes(&self) -> bool {
        self.expose_session_attributes
    }

    pub fn set_expose_session_attributes(&mut self, expose: bool) {
        self.expose_session_attributes = expose;
    }

    pub fn allow_request_override(&self) -> bool {
        self.allow_request_override
    }

    pub fn set_allow_request_override(&mut self, allow: bool) {
        self.allow_request_override = allow;
    }

    pub fn allow_session_override(&self) -> bool {
        self.allow_session_override
    }

    pub fn set_allow_session_override(&mut self, allow: bool) {
        self.allow_session_override = allow;
    }

    pub fn expose_spring_macro_helpers(&self) -> bool {
        self.expose_spring_macro_helpers
    }

    pub fn set_expose_spring_macro_helpers(&mut self, expose: bool) {
        self.expose_spring_macro_helpers = expose;
    }

    /// Snapshot of these settings in the shape the MVC integration expects
    pub fn mvc_settings(&self) -> MvcViewResolverSettings {
        MvcViewResolverSettings {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            cache: self.cache,
            content_type: self.effective_content_type(),
            view_names: self.view_names.clone(),
            expose_request_attributes: self.expose_request_attributes,
            allow_request_override: self.allow_request_override,
            allow_session_override: self.allow_session_override,
            expose_session_attributes: self.expose_session_attributes,
            expose_spring_macro_helpers: self.expose_spring_macro_helpers,
            request_context_attribute: self.request_context_attribute.clone(),
            order: VIEW_RESOLVER_ORDER,
        }
    }

    /// Copy these settings onto a resolver one setter at a time
    ///
    /// The resolver usually acts as a fallback, so its order is always set to
    /// [`VIEW_RESOLVER_ORDER`].
    pub fn apply_to_template_view_resolver<R>(&self, resolver: &mut R)
    where
        R: TemplateViewResolver + ?Sized,
    {
        resolver.set_prefix(&self.prefix);
        resolver.set_suffix(&self.suffix);
        resolver.set_cache(self.cache);
        if let Some(content_type) = self.effective_content_type() {
            resolver.set_content_type(&content_type);
        }
        resolver.set_view_names(self.view_names.as_deref());
        resolver.set_expose_request_attributes(self.expose_request_attributes);
        resolver.set_allow_request_override(self.allow_request_override);
        resolver.set_allow_session_override(self.allow_session_override);
        resolver.set_expose_session_attributes(self.expose_session_attributes);
        resolver.set_expose_spring_macro_helpers(self.expose_spring_macro_helpers);
        resolver.set_request_context_attribute(self.request_context_attribute.as_deref());
        resolver.set_order(VIEW_RESOLVER_ORDER);
    }

    /// Hand these settings to a resolver through the MVC integration
    ///
    /// Fails with [`ConfigError::TypeMismatch`] when the resolver does not
    /// support that integration, and with [`ConfigError::Configuration`]
    /// when the resolver rejects the settings.
    pub fn apply_to_mvc_view_resolver(&self, resolver: &mut dyn ViewResolver) -> Result<()> {
        let name = resolver.name().to_string();
        let Some(target) = resolver.as_mvc_view_resolver() else {
            return Err(ConfigError::type_mismatch("MvcViewResolver", name));
        };

        debug!(resolver = %name, "delegating template settings to MVC integration");
        target.configure(&self.mvc_settings()).map_err(|source| {
            ConfigError::configuration(format!("failed to configure view resolver '{}'", name), source)
        })
    }
}

fn has_charset_parameter(content_type: &str) -> bool {
    content_type.split(';').skip(1).any(|parameter| {
        parameter
            .split_once('=')
            .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
    })
}
