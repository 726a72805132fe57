use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

use super::velocity::VelocityProperties;
use crate::error::{ConfigError, Result};

/// Namespace that Velocity settings are bound from
pub const PREFIX: &str = "spring.velocity";

const PROPERTIES_KEY: &str = "properties";

/// Fields that accept `"true"`/`"false"` strings as well as JSON booleans
const BOOLEAN_FIELDS: &[&str] = &[
    "enabled",
    "cache",
    "checkTemplateLocation",
    "exposeRequestAttributes",
    "exposeSessionAttributes",
    "allowRequestOverride",
    "allowSessionOverride",
    "exposeSpringMacroHelpers",
    "preferFileSystemAccess",
];

/// Bind settings from a JSON document
///
/// The settings may sit under nested objects (`{"spring": {"velocity": {..}}}`),
/// under a dotted key (`{"spring.velocity": {..}}`), or as fully dotted keys
/// (`{"spring.velocity.suffix": ".html"}`). Later forms win over earlier ones.
/// A document without any of them yields the defaults.
///
/// Values are read as leniently as flat pairs: boolean fields accept
/// `"true"`/`"false"` strings, `viewNames` accepts a comma-separated string,
/// and `properties` entries are flattened to dotted names with string values.
///
/// # Example
/// ```
/// use velocity_config::config::bind_document;
/// use serde_json::json;
///
/// let properties = bind_document(&json!({
///     "spring": {"velocity": {"resource-loader-path": "file:/srv/templates/"}},
///     "spring.velocity.properties.input.encoding": "UTF-8"
/// }))
/// .unwrap();
///
/// assert_eq!(properties.resource_loader_path(), "file:/srv/templates/");
/// assert_eq!(properties.properties()["input.encoding"], "UTF-8");
/// ```
pub fn bind_document(document: &Value) -> Result<VelocityProperties> {
    let mut section = Section::default();

    if let Some(nested) = document.get("spring").and_then(|spring| spring.get("velocity")) {
        section.merge(nested)?;
    }

    if let Some(root) = document.as_object() {
        if let Some(dotted) = root.get(PREFIX) {
            section.merge(dotted)?;
        }

        for (key, value) in root {
            if let Some(rest) = strip_prefix(key) {
                section.insert(rest, value.clone())?;
            }
        }
    }

    debug!(
        keys = section.fields.len(),
        properties = section.properties.len(),
        "binding velocity settings from document"
    );
    Ok(serde_json::from_value(section.into_value())?)
}

/// Bind settings from a flat namespace of string keys and values
///
/// Keys outside [`PREFIX`] are ignored. See [`apply_pairs`] for how values are
/// read.
pub fn bind_pairs<I, K, V>(pairs: I) -> Result<VelocityProperties>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut properties = VelocityProperties::default();
    apply_pairs(&mut properties, pairs)?;
    Ok(properties)
}

/// Overlay flat string settings onto existing ones
///
/// - names are relaxed: `resource-loader-path`, `resource_loader_path` and
///   `resourceLoaderPath` are the same key
/// - `properties.<name>` adds `<name>` verbatim to the passthrough map
/// - boolean keys accept `true` or `false` in any case
/// - `view-names` is a comma-separated list
/// - unknown keys are ignored
pub fn apply_pairs<I, K, V>(properties: &mut VelocityProperties, pairs: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in pairs {
        let (key, value) = (key.as_ref(), value.as_ref());
        let Some(rest) = strip_prefix(key) else {
            trace!(key, "skipping key outside {}", PREFIX);
            continue;
        };

        if let Some(name) = rest.strip_prefix("properties.") {
            properties
                .properties_mut()
                .insert(name.to_string(), value.to_string());
            continue;
        }

        match canonical_name(rest).as_str() {
            "resourceLoaderPath" => properties.set_resource_loader_path(value),
            "dateToolAttribute" => properties.set_date_tool_attribute(Some(value.to_string())),
            "numberToolAttribute" => properties.set_number_tool_attribute(Some(value.to_string())),
            "toolboxConfigLocation" => {
                properties.set_toolbox_config_location(Some(value.to_string()))
            }
            "preferFileSystemAccess" => {
                properties.set_prefer_file_system_access(parse_bool(key, value)?)
            }
            "prefix" => properties.base_mut().set_prefix(value),
            "suffix" => properties.base_mut().set_suffix(value),
            "enabled" => properties.base_mut().set_enabled(parse_bool(key, value)?),
            "cache" => properties.base_mut().set_cache(parse_bool(key, value)?),
            "contentType" => properties.base_mut().set_content_type(Some(value.to_string())),
            "charset" => properties.base_mut().set_charset(Some(value.to_string())),
            "viewNames" => properties.base_mut().set_view_names(Some(parse_list(value))),
            "checkTemplateLocation" => {
                properties.base_mut().set_check_template_location(parse_bool(key, value)?)
            }
            "requestContextAttribute" => {
                properties.base_mut().set_request_context_attribute(Some(value.to_string()))
            }
            "exposeRequestAttributes" => {
                properties.base_mut().set_expose_request_attributes(parse_bool(key, value)?)
            }
            "exposeSessionAttributes" => {
                properties.base_mut().set_expose_session_attributes(parse_bool(key, value)?)
            }
            "allowRequestOverride" => {
                properties.base_mut().set_allow_request_override(parse_bool(key, value)?)
            }
            "allowSessionOverride" => {
                properties.base_mut().set_allow_session_override(parse_bool(key, value)?)
            }
            "exposeSpringMacroHelpers" => {
                properties.base_mut().set_expose_spring_macro_helpers(parse_bool(key, value)?)
            }
            _ => {
                debug!(key, "ignoring unknown velocity setting");
                continue;
            }
        }
        trace!(key, value, "bound velocity setting");
    }
    Ok(())
}

/// Read a JSON settings file and bind it with [`bind_document`]
pub fn load_file(path: impl AsRef<Path>) -> Result<VelocityProperties> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let document: Value = serde_json::from_str(&contents)?;
    bind_document(&document)
}

/// Convert a relaxed key to its camelCase field name
///
/// Keys without `-` or `_` are returned unchanged.
pub fn canonical_name(name: &str) -> String {
    if !name.contains(['-', '_']) {
        return name.to_string();
    }

    let mut canonical = String::with_capacity(name.len());
    for (i, word) in name.split(['-', '_']).filter(|w| !w.is_empty()).enumerate() {
        let word = word.to_ascii_lowercase();
        if i == 0 {
            canonical.push_str(&word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                canonical.push(first.to_ascii_uppercase());
                canonical.push_str(chars.as_str());
            }
        }
    }
    canonical
}

fn strip_prefix(key: &str) -> Option<&str> {
    key.strip_prefix(PREFIX)?.strip_prefix('.')
}

/// Settings collected from a document before they are deserialized
#[derive(Default)]
struct Section {
    fields: Map<String, Value>,
    /// Passthrough engine properties, flattened to dotted string entries
    properties: Map<String, Value>,
}

impl Section {
    /// Merge a settings object, canonicalizing its keys
    fn merge(&mut self, value: &Value) -> Result<()> {
        if let Some(object) = value.as_object() {
            for (key, value) in object {
                self.insert(key, value.clone())?;
            }
        }
        Ok(())
    }

    fn insert(&mut self, key: &str, value: Value) -> Result<()> {
        if let Some(name) = key.strip_prefix("properties.") {
            flatten_property(&mut self.properties, name, &value);
            return Ok(());
        }

        let key = canonical_name(key);
        let value = match value {
            Value::Object(object) if key == PROPERTIES_KEY => {
                for (name, value) in &object {
                    flatten_property(&mut self.properties, name, value);
                }
                return Ok(());
            }
            other if key == PROPERTIES_KEY => {
                return Err(ConfigError::invalid_value(
                    format!("{}.{}", PREFIX, key),
                    other.to_string(),
                    "a map of properties",
                ));
            }
            Value::String(text) if BOOLEAN_FIELDS.contains(&key.as_str()) => {
                Value::Bool(parse_bool(&format!("{}.{}", PREFIX, key), &text)?)
            }
            Value::String(text) if key == "viewNames" => Value::from(parse_list(&text)),
            other => other,
        };
        self.fields.insert(key, value);
        Ok(())
    }

    fn into_value(self) -> Value {
        let mut fields = self.fields;
        if !self.properties.is_empty() {
            fields.insert(PROPERTIES_KEY.to_string(), Value::Object(self.properties));
        }
        Value::Object(fields)
    }
}

/// Add a passthrough property, flattening nested objects into dotted names
///
/// Scalars become their string form, arrays a comma-separated list, nulls are
/// dropped.
fn flatten_property(target: &mut Map<String, Value>, name: &str, value: &Value) {
    match value {
        Value::Object(object) => {
            for (key, value) in object {
                flatten_property(target, &format!("{}.{}", name, key), value);
            }
        }
        Value::Null => {}
        Value::Array(items) => {
            let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(",");
            target.insert(name.to_string(), Value::String(joined));
        }
        scalar => {
            target.insert(name.to_string(), Value::String(scalar_text(scalar)));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::invalid_value(key, value, "true or false"))
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
