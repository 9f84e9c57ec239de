//! Component classes
//!
//! A class pairs a custom element tag with a template function, default
//! data and the custom event names its instances accept. Classes live in
//! a [`ClassRegistry`] keyed both by class name and by tag, so nested tags
//! found in rendered markup dispatch to the right class.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use sipa_codec::{Map, Value};
use sipa_dom::{escape_attribute, escape_text};

use crate::{ComponentError, SipaId};

/// Template function: data in, markup out
pub type TemplateFn = Rc<dyn Fn(&TemplateContext<'_>) -> String>;

/// What a template sees while rendering
pub struct TemplateContext<'a> {
    pub id: SipaId,
    pub alias: Option<&'a str>,
    pub data: &'a Map,
}

impl<'a> TemplateContext<'a> {
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.data.get(key)
    }

    /// Display form of a data field, escaped for text content
    pub fn text(&self, key: &str) -> String {
        escape_text(&self.raw(key))
    }

    /// Display form of a data field, escaped for an attribute value
    pub fn attr(&self, key: &str) -> String {
        escape_attribute(&self.raw(key))
    }

    /// Unescaped display form; missing fields render empty
    pub fn raw(&self, key: &str) -> String {
        self.get(key).map(display).unwrap_or_default()
    }
}

/// String conversion used when a value is interpolated into markup
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Undefined | Value::Null | Value::Empty | Value::Handle(_) => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(*n),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        Value::RegExp(re) => re.to_string(),
        Value::Function(f) => f.source().to_string(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn display_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Component class definition
#[derive(Clone)]
pub struct ComponentClass {
    name: String,
    tag: String,
    defaults: Map,
    events: Vec<String>,
    template: TemplateFn,
}

impl ComponentClass {
    pub fn new<F>(name: &str, tag: &str, template: F) -> Self
    where
        F: Fn(&TemplateContext<'_>) -> String + 'static,
    {
        Self {
            name: name.to_string(),
            tag: tag.to_ascii_lowercase(),
            defaults: Map::new(),
            events: Vec::new(),
            template: Rc::new(template),
        }
    }

    /// Default data merged under every instance's initial data
    pub fn with_defaults(mut self, defaults: Map) -> Self {
        self.defaults = defaults;
        self
    }

    /// Custom events instances accept besides the lifecycle hooks
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn defaults(&self) -> &Map {
        &self.defaults
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub(crate) fn render_template(&self, ctx: &TemplateContext<'_>) -> String {
        (self.template)(ctx)
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("defaults", &self.defaults)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Class registry
#[derive(Debug, Default)]
pub struct ClassRegistry {
    definitions: HashMap<String, Rc<ComponentClass>>,
    tags: HashMap<String, String>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a class; both its name and its tag must be unused
    pub fn define(&mut self, class: ComponentClass) -> Result<Rc<ComponentClass>, ComponentError> {
        if !Self::is_valid_tag(class.tag()) {
            return Err(ComponentError::InvalidTagName(class.tag().to_string()));
        }
        if self.definitions.contains_key(class.name()) {
            return Err(ComponentError::AlreadyDefined(class.name().to_string()));
        }
        if let Some(owner) = self.tags.get(class.tag()) {
            return Err(ComponentError::AlreadyDefined(owner.clone()));
        }

        let class = Rc::new(class);
        self.tags.insert(class.tag().to_string(), class.name().to_string());
        self.definitions.insert(class.name().to_string(), class.clone());
        tracing::debug!("defined component class {} as <{}>", class.name(), class.tag());
        Ok(class)
    }

    pub fn get(&self, name: &str) -> Option<Rc<ComponentClass>> {
        self.definitions.get(name).cloned()
    }

    /// Class registered for a tag, case-insensitive
    pub fn by_tag(&self, tag: &str) -> Option<Rc<ComponentClass>> {
        let name = self.tags.get(&tag.to_ascii_lowercase())?;
        self.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Custom element name rules: a hyphen, a lowercase first letter, not reserved
    fn is_valid_tag(tag: &str) -> bool {
        if !tag.contains('-') {
            return false;
        }

        if !tag.chars().next().map(|c| c.is_ascii_lowercase()).unwrap_or(false) {
            return false;
        }

        let reserved = [
            "annotation-xml",
            "color-profile",
            "font-face",
            "font-face-src",
            "font-face-uri",
            "font-face-format",
            "font-face-name",
            "missing-glyph",
        ];
        !reserved.contains(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, tag: &str) -> ComponentClass {
        ComponentClass::new(name, tag, |_| "<div></div>".to_string())
    }

    #[test]
    fn test_valid_tags() {
        assert!(ClassRegistry::is_valid_tag("my-element"));
        assert!(ClassRegistry::is_valid_tag("todo-list"));
        assert!(!ClassRegistry::is_valid_tag("myelement"));
        assert!(!ClassRegistry::is_valid_tag("1-element"));
        assert!(!ClassRegistry::is_valid_tag("font-face"));
    }

    #[test]
    fn test_define_and_lookup() {
        let mut registry = ClassRegistry::new();
        registry.define(class("TodoList", "todo-list")).unwrap();

        assert!(registry.is_defined("TodoList"));
        assert_eq!(registry.by_tag("TODO-LIST").unwrap().name(), "TodoList");
        assert!(registry.by_tag("todo-item").is_none());
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut registry = ClassRegistry::new();
        registry.define(class("TodoList", "todo-list")).unwrap();

        assert!(matches!(
            registry.define(class("TodoList", "other-list")),
            Err(ComponentError::AlreadyDefined(_))
        ));
        assert!(matches!(
            registry.define(class("Other", "todo-list")),
            Err(ComponentError::AlreadyDefined(owner)) if owner == "TodoList"
        ));
        assert!(matches!(
            registry.define(class("Bad", "bad")),
            Err(ComponentError::InvalidTagName(_))
        ));
    }

    #[test]
    fn test_template_context_display() {
        let data: Map = [
            ("count", Value::from(3)),
            ("ratio", Value::from(0.5)),
            ("name", Value::from("<b>")),
            ("tags", Value::Array(vec![Value::from("a"), Value::from(1)])),
        ]
        .into_iter()
        .collect();
        let ctx = TemplateContext { id: 1, alias: None, data: &data };

        assert_eq!(ctx.text("count"), "3");
        assert_eq!(ctx.text("ratio"), "0.5");
        assert_eq!(ctx.text("name"), "&lt;b&gt;");
        assert_eq!(ctx.raw("tags"), "a,1");
        assert_eq!(ctx.text("missing"), "");
    }
}
