use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::template::TemplateViewResolverProperties;
use crate::error::{ConfigError, Result};
use crate::resolver::{ResolverIntegration, VelocityViewResolver, ViewResolver};

pub const DEFAULT_RESOURCE_LOADER_PATH: &str = "classpath:/templates/";

pub const DEFAULT_PREFIX: &str = "";

pub const DEFAULT_SUFFIX: &str = ".vm";

/// Settings for the Velocity template engine and its view resolver
///
/// Bound from keys under `spring.velocity`. Paths and tool names are taken
/// as given; nothing is checked for existence or format.
///
/// # Example
/// ```
/// use velocity_config::VelocityProperties;
/// use velocity_config::resolver::memory::InMemoryViewResolver;
///
/// let mut properties = VelocityProperties::default();
/// properties.set_date_tool_attribute(Some("date".to_string()));
///
/// let mut resolver = InMemoryViewResolver::new("velocityViewResolver");
/// properties.apply_to_view_resolver(&mut resolver).unwrap();
///
/// assert_eq!(resolver.suffix, ".vm");
/// assert_eq!(resolver.date_tool_attribute.as_deref(), Some("date"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "VelocityPropertiesSource")]
pub struct VelocityProperties {
    #[serde(flatten)]
    base: TemplateViewResolverProperties,

    /// Name of the DateTool helper object exposed in the Velocity context
    #[serde(skip_serializing_if = "Option::is_none")]
    date_tool_attribute: Option<String>,

    /// Name of the NumberTool helper object exposed in the Velocity context
    #[serde(skip_serializing_if = "Option::is_none")]
    number_tool_attribute: Option<String>,

    /// Additional engine properties, passed through untouched
    properties: HashMap<String, String>,

    /// Template path
    resource_loader_path: String,

    /// Velocity Tools toolbox definition file, e.g. "/WEB-INF/toolbox.xml"
    #[serde(skip_serializing_if = "Option::is_none")]
    toolbox_config_location: Option<String>,

    /// File system access enables hot detection of template changes
    prefer_file_system_access: bool,

    #[serde(skip)]
    integration: ResolverIntegration,
}

/// Input shape for [`VelocityProperties`]
///
/// Prefix and suffix are read here rather than by the embedded base so that
/// omitted keys fall back to the Velocity defaults.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VelocityPropertiesSource {
    prefix: Option<String>,
    suffix: Option<String>,
    #[serde(flatten)]
    base: TemplateViewResolverProperties,
    date_tool_attribute: Option<String>,
    number_tool_attribute: Option<String>,
    #[serde(default)]
    properties: HashMap<String, String>,
    resource_loader_path: Option<String>,
    toolbox_config_location: Option<String>,
    prefer_file_system_access: Option<bool>,
}

impl From<VelocityPropertiesSource> for VelocityProperties {
    fn from(source: VelocityPropertiesSource) -> Self {
        let mut base = source.base;
        base.set_prefix(source.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()));
        base.set_suffix(source.suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string()));

        Self {
            base,
            date_tool_attribute: source.date_tool_attribute,
            number_tool_attribute: source.number_tool_attribute,
            properties: source.properties,
            resource_loader_path: source
                .resource_loader_path
                .unwrap_or_else(|| DEFAULT_RESOURCE_LOADER_PATH.to_string()),
            toolbox_config_location: source.toolbox_config_location,
            prefer_file_system_access: source.prefer_file_system_access.unwrap_or(true),
            integration: ResolverIntegration::default(),
        }
    }
}

impl Default for VelocityProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityProperties {
    pub fn new() -> Self {
        Self {
            base: TemplateViewResolverProperties::new(DEFAULT_PREFIX, DEFAULT_SUFFIX),
            date_tool_attribute: None,
            number_tool_attribute: None,
            properties: HashMap::new(),
            resource_loader_path: DEFAULT_RESOURCE_LOADER_PATH.to_string(),
            toolbox_config_location: None,
            prefer_file_system_access: true,
            integration: ResolverIntegration::default(),
        }
    }

    /// Use a specific resolver integration instead of the build-time default
    pub fn with_integration(mut self, integration: ResolverIntegration) -> Self {
        self.integration = integration;
        self
    }

    /// Settings shared with other template engines
    pub fn base(&self) -> &TemplateViewResolverProperties {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut TemplateViewResolverProperties {
        &mut self.base
    }

    pub fn prefix(&self) -> &str {
        self.base.prefix()
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.base.set_prefix(prefix);
    }

    pub fn suffix(&self) -> &str {
        self.base.suffix()
    }

    pub fn set_suffix(&mut self, suffix: impl Into<String>) {
        self.base.set_suffix(suffix);
    }

    pub fn date_tool_attribute(&self) -> Option<&str> {
        self.date_tool_attribute.as_deref()
    }

    pub fn set_date_tool_attribute(&mut self, attribute: Option<String>) {
        self.date_tool_attribute = attribute;
    }

    pub fn number_tool_attribute(&self) -> Option<&str> {
        self.number_tool_attribute.as_deref()
    }

    pub fn set_number_tool_attribute(&mut self, attribute: Option<String>) {
        self.number_tool_attribute = attribute;
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.properties
    }

    pub fn set_properties(&mut self, properties: HashMap<String, String>) {
        self.properties = properties;
    }

    pub fn resource_loader_path(&self) -> &str {
        &self.resource_loader_path
    }

    pub fn set_resource_loader_path(&mut self, path: impl Into<String>) {
        self.resource_loader_path = path.into();
    }

    pub fn toolbox_config_location(&self) -> Option<&str> {
        self.toolbox_config_location.as_deref()
    }

    pub fn set_toolbox_config_location(&mut self, location: Option<String>) {
        self.toolbox_config_location = location;
    }

    pub fn prefer_file_system_access(&self) -> bool {
        self.prefer_file_system_access
    }

    pub fn set_prefer_file_system_access(&mut self, prefer: bool) {
        self.prefer_file_system_access = prefer;
    }

    pub fn integration(&self) -> ResolverIntegration {
        self.integration
    }

    pub fn set_integration(&mut self, integration: ResolverIntegration) {
        self.integration = integration;
    }

    /// Apply every setting to a resolver known to be a Velocity resolver
    ///
    /// Always copies through the setter surface, whatever integration is
    /// selected.
    pub fn apply_to<R>(&self, resolver: &mut R)
    where
        R: VelocityViewResolver + ?Sized,
    {
        self.base.apply_to_template_view_resolver(resolver);
        self.apply_velocity_attributes(resolver);
    }

    /// Apply every setting to a registered view resolver
    ///
    /// Base settings go through the selected [`ResolverIntegration`], then the
    /// Velocity-specific ones are set directly. Capabilities are checked
    /// before anything is written, so a [`ConfigError::TypeMismatch`] leaves
    /// the resolver untouched. A failure inside the MVC integration is
    /// reported as [`ConfigError::Configuration`] and may leave the resolver
    /// partially configured.
    pub fn apply_to_view_resolver(&self, resolver: &mut dyn ViewResolver) -> Result<()> {
        let name = resolver.name().to_string();
        if resolver.as_velocity_view_resolver().is_none() {
            return Err(ConfigError::type_mismatch("VelocityViewResolver", name));
        }

        debug!(resolver = %name, integration = ?self.integration, "applying velocity settings");
        match self.integration {
            ResolverIntegration::Legacy => {}
            ResolverIntegration::Mvc => {
                if resolver.as_mvc_view_resolver().is_none() {
                    return Err(ConfigError::type_mismatch("MvcViewResolver", name));
                }
                self.base.apply_to_mvc_view_resolver(resolver)?;
            }
        }

        let target = resolver
            .as_velocity_view_resolver()
            .ok_or_else(|| ConfigError::type_mismatch("VelocityViewResolver", name.as_str()))?;
        if self.integration == ResolverIntegration::Legacy {
            self.base.apply_to_template_view_resolver(&mut *target);
        }
        self.apply_velocity_attributes(target);
        Ok(())
    }

    fn apply_velocity_attributes<R>(&self, resolver: &mut R)
    where
        R: VelocityViewResolver + ?Sized,
    {
        resolver.set_toolbox_config_location(self.toolbox_config_location.as_deref());
        resolver.set_date_tool_attribute(self.date_tool_attribute.as_deref());
        resolver.set_number_tool_attribute(self.number_tool_attribute.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::memory::InMemoryViewResolver;
    use crate::resolver::LOWEST_PRECEDENCE;
    use serde_json::json;
    use std::error::Error;

    /// Resolver that only advertises a name
    struct JsonViewResolver;

    impl ViewResolver for JsonViewResolver {
        fn name(&self) -> &str {
            "jsonViewResolver"
        }
    }

    /// Velocity resolver that predates the MVC integration
    struct LegacyOnlyResolver(InMemoryViewResolver);

    impl ViewResolver for LegacyOnlyResolver {
        fn name(&self) -> &str {
            &self.0.name
        }

        fn as_velocity_view_resolver(&mut self) -> Option<&mut dyn VelocityViewResolver> {
            Some(&mut self.0)
        }
    }

    fn configured() -> VelocityProperties {
        let mut properties = VelocityProperties::new();
        properties.set_prefix("/WEB-INF/velocity/");
        properties.set_suffix(".vtl");
        properties.base_mut().set_cache(true);
        properties.base_mut().set_view_names(Some(vec!["reports/*".to_string()]));
        properties.base_mut().set_expose_request_attributes(true);
        properties.base_mut().set_allow_session_override(true);
        properties.base_mut().set_request_context_attribute(Some("rc".to_string()));
        properties.set_toolbox_config_location(Some("/WEB-INF/toolbox.xml".to_string()));
        properties.set_date_tool_attribute(Some("date".to_string()));
        properties.set_number_tool_attribute(Some("number".to_string()));
        properties
    }

    fn assert_applied(resolver: &InMemoryViewResolver) {
        assert_eq!(resolver.prefix, "/WEB-INF/velocity/");
        assert_eq!(resolver.suffix, ".vtl");
        assert!(resolver.cache);
        assert_eq!(resolver.content_type.as_deref(), Some("text/html;charset=UTF-8"));
        assert_eq!(resolver.view_names, Some(vec!["reports/*".to_string()]));
        assert!(resolver.expose_request_attributes);
        assert!(!resolver.allow_request_override);
        assert!(resolver.allow_session_override);
        assert!(!resolver.expose_session_attributes);
        assert!(resolver.expose_spring_macro_helpers);
        assert_eq!(resolver.request_context_attribute.as_deref(), Some("rc"));
        assert_eq!(resolver.toolbox_config_location.as_deref(), Some("/WEB-INF/toolbox.xml"));
        assert_eq!(resolver.date_tool_attribute.as_deref(), Some("date"));
        assert_eq!(resolver.number_tool_attribute.as_deref(), Some("number"));
        assert_eq!(resolver.order, LOWEST_PRECEDENCE - 5);
    }

    #[test]
    fn test_defaults() {
        let properties = VelocityProperties::default();

        assert_eq!(properties.resource_loader_path(), "classpath:/templates/");
        assert_eq!(properties.prefix(), "");
        assert_eq!(properties.suffix(), ".vm");
        assert!(properties.prefer_file_system_access());
        assert_eq!(properties.date_tool_attribute(), None);
        assert_eq!(properties.number_tool_attribute(), None);
        assert_eq!(properties.toolbox_config_location(), None);
        assert!(properties.properties().is_empty());
        assert_eq!(properties.integration(), ResolverIntegration::default());
    }

    #[test]
    fn test_setters_round_trip() {
        let mut properties = VelocityProperties::new();

        properties.set_resource_loader_path("file:./templates/");
        properties.set_prefix("views/");
        properties.set_suffix(".html");
        properties.set_date_tool_attribute(Some("dateTool".to_string()));
        properties.set_number_tool_attribute(Some("numberTool".to_string()));
        properties.set_toolbox_config_location(Some("not even a path".to_string()));
        properties.set_prefer_file_system_access(false);
        properties.set_integration(ResolverIntegration::Mvc);

        assert_eq!(properties.resource_loader_path(), "file:./templates/");
        assert_eq!(properties.prefix(), "views/");
        assert_eq!(properties.suffix(), ".html");
        assert_eq!(properties.date_tool_attribute(), Some("dateTool"));
        assert_eq!(properties.number_tool_attribute(), Some("numberTool"));
        assert_eq!(properties.toolbox_config_location(), Some("not even a path"));
        assert!(!properties.prefer_file_system_access());
        assert_eq!(properties.integration(), ResolverIntegration::Mvc);

        properties.set_date_tool_attribute(None);
        assert_eq!(properties.date_tool_attribute(), None);
    }

    #[test]
    fn test_properties_map_is_independent() {
        let mut properties = VelocityProperties::new();
        properties
            .properties_mut()
            .insert("input.encoding".to_string(), "UTF-8".to_string());
        properties
            .properties_mut()
            .insert("velocimacro.library".to_string(), "macros.vm".to_string());

        assert_eq!(properties.properties().len(), 2);
        assert_eq!(
            properties.properties().get("input.encoding").map(String::as_str),
            Some("UTF-8")
        );
        assert_eq!(properties.suffix(), ".vm");
        assert_eq!(properties.resource_loader_path(), DEFAULT_RESOURCE_LOADER_PATH);

        let replacement = HashMap::from([("a".to_string(), "b".to_string())]);
        properties.set_properties(replacement.clone());
        assert_eq!(properties.properties(), &replacement);
    }

    #[test]
    fn test_apply_legacy() {
        let properties = configured().with_integration(ResolverIntegration::Legacy);
        let mut resolver = InMemoryViewResolver::new("velocityViewResolver");

        properties.apply_to_view_resolver(&mut resolver).unwrap();

        assert_applied(&resolver);
    }

    #[test]
    fn test_apply_mvc() {
        let properties = configured().with_integration(ResolverIntegration::Mvc);
        let mut resolver = InMemoryViewResolver::new("velocityViewResolver");

        properties.apply_to_view_resolver(&mut resolver).unwrap();

        assert_applied(&resolver);
    }

    #[test]
    fn test_apply_static() {
        let properties = configured().with_integration(ResolverIntegration::Mvc);
        let mut resolver = InMemoryViewResolver::new("velocityViewResolver").with_mvc_failure("unused");

        properties.apply_to(&mut resolver);

        assert_applied(&resolver);
    }

    #[test]
    fn test_apply_clears_unset_tool_attributes() {
        let properties = VelocityProperties::new().with_integration(ResolverIntegration::Legacy);
        let mut resolver = InMemoryViewResolver::new("velocityViewResolver");
        resolver.set_date_tool_attribute(Some("stale"));

        properties.apply_to_view_resolver(&mut resolver).unwrap();

        assert_eq!(resolver.date_tool_attribute, None);
        assert_eq!(resolver.suffix, ".vm");
    }

    #[test]
    fn test_apply_type_mismatch() {
        for integration in [ResolverIntegration::Legacy, ResolverIntegration::Mvc] {
            let properties = configured().with_integration(integration);
            let mut resolver = JsonViewResolver;

            let err = properties.apply_to_view_resolver(&mut resolver).unwrap_err();
            match err {
                ConfigError::TypeMismatch { expected, actual } => {
                    assert_eq!(expected, "VelocityViewResolver");
                    assert_eq!(actual, "jsonViewResolver");
                }
                other => panic!("expected TypeMismatch, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_apply_mvc_without_mvc_capability_leaves_resolver_untouched() {
        let properties = configured().with_integration(ResolverIntegration::Mvc);
        let mut resolver = LegacyOnlyResolver(InMemoryViewResolver::new("legacyVelocity"));
        let before = resolver.0.clone();

        let err = properties.apply_to_view_resolver(&mut resolver).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::TypeMismatch { ref expected, .. } if expected == "MvcViewResolver"
        ));
        assert_eq!(resolver.0, before);
    }

    #[test]
    fn test_apply_legacy_without_mvc_capability() {
        let properties = configured().with_integration(ResolverIntegration::Legacy);
        let mut resolver = LegacyOnlyResolver(InMemoryViewResolver::new("legacyVelocity"));

        properties.apply_to_view_resolver(&mut resolver).unwrap();

        assert_applied(&resolver.0);
    }

    #[test]
    fn test_apply_mvc_failure_is_configuration_error() {
        let properties = configured().with_integration(ResolverIntegration::Mvc);
        let mut resolver =
            InMemoryViewResolver::new("velocityViewResolver").with_mvc_failure("resolver is frozen");

        let err = properties.apply_to_view_resolver(&mut resolver).unwrap_err();

        assert!(matches!(err, ConfigError::Configuration { .. }));
        assert!(err.to_string().contains("velocityViewResolver"));
        assert_eq!(err.source().unwrap().to_string(), "resolver is frozen");
        assert_eq!(resolver.date_tool_attribute, None);
    }

    #[test]
    fn test_deserialize_empty_is_default() {
        let properties: VelocityProperties = serde_json::from_value(json!({})).unwrap();
        assert_eq!(properties, VelocityProperties::default());
    }

    #[test]
    fn test_deserialize_overrides() {
        let properties: VelocityProperties = serde_json::from_value(json!({
            "resourceLoaderPath": "file:/srv/templates/",
            "prefix": "pages/",
            "cache": true,
            "dateToolAttribute": "date",
            "preferFileSystemAccess": false,
            "properties": {"input.encoding": "UTF-8"},
            "unknownKey": 1
        }))
        .unwrap();

        assert_eq!(properties.resource_loader_path(), "file:/srv/templates/");
        assert_eq!(properties.prefix(), "pages/");
        assert_eq!(properties.suffix(), ".vm");
        assert!(properties.base().cache());
        assert_eq!(properties.date_tool_attribute(), Some("date"));
        assert!(!properties.prefer_file_system_access());
        assert_eq!(
            properties.properties().get("input.encoding").map(String::as_str),
            Some("UTF-8")
        );
    }

    #[test]
    fn test_serialize_then_deserialize_preserves_settings() {
        let properties = configured();
        let value = serde_json::to_value(&properties).unwrap();

        assert_eq!(value["suffix"], json!(".vtl"));
        assert_eq!(value["toolboxConfigLocation"], json!("/WEB-INF/toolbox.xml"));
        assert!(value.get("integration").is_none());

        let restored: VelocityProperties = serde_json::from_value(value).unwrap();
        assert_eq!(restored, properties);
    }
}
