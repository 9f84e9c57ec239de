//! App context
//!
//! An [`App`] owns everything one component universe needs: the class
//! registry, the live instance registry and the render target. Apps are
//! independent of each other; components hold a weak reference back to
//! the app that created them.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use sipa_codec::{parse_literal, Map, Value};
use sipa_dom::{Document, NodeId};

use crate::component::expect_object;
use crate::{
    ClassRegistry, Component, ComponentClass, ComponentError, ComponentOptions, ComponentRegistry,
    RenderTarget, SipaId, ALIAS_ATTRIBUTE, CLASS_ATTRIBUTE, ID_ATTRIBUTE,
};

/// Behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    /// Destroy children whose alias a re-render no longer produces
    pub prune_orphaned_children: bool,
    /// Reject custom triggers outside a class's declared events
    pub validate_custom_triggers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prune_orphaned_children: true,
            validate_custom_triggers: true,
        }
    }
}

/// Component universe
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

pub(crate) struct AppInner {
    config: AppConfig,
    classes: RefCell<ClassRegistry>,
    registry: RefCell<ComponentRegistry>,
    target: RefCell<Box<dyn RenderTarget>>,
}

impl App {
    /// App rendering into `target`
    pub fn new(target: impl RenderTarget + 'static) -> Self {
        Self::with_config(target, AppConfig::default())
    }

    pub fn with_config(target: impl RenderTarget + 'static, config: AppConfig) -> Self {
        Self {
            inner: Rc::new(AppInner {
                config,
                classes: RefCell::new(ClassRegistry::new()),
                registry: RefCell::new(ComponentRegistry::new()),
                target: RefCell::new(Box::new(target)),
            }),
        }
    }

    /// App rendering into an empty headless document
    pub fn headless() -> Self {
        Self::new(Document::default())
    }

    pub(crate) fn from_inner(inner: Rc<AppInner>) -> Self {
        Self { inner }
    }

    fn downgrade(&self) -> Weak<AppInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn config(&self) -> AppConfig {
        self.inner.config
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    pub fn define(&self, class: ComponentClass) -> Result<Rc<ComponentClass>, ComponentError> {
        self.inner.classes.borrow_mut().define(class)
    }

    pub fn class(&self, name: &str) -> Option<Rc<ComponentClass>> {
        self.inner.classes.borrow().get(name)
    }

    pub(crate) fn classes(&self) -> Ref<'_, ClassRegistry> {
        self.inner.classes.borrow()
    }

    // ------------------------------------------------------------------
    // Target
    // ------------------------------------------------------------------

    /// Borrow the render target. Do not hold the borrow across calls
    /// into components.
    pub fn target(&self) -> Ref<'_, Box<dyn RenderTarget>> {
        self.inner.target.borrow()
    }

    /// Borrow the render target mutably, with the same caveat as [`App::target`]
    pub fn target_mut(&self) -> RefMut<'_, Box<dyn RenderTarget>> {
        self.inner.target.borrow_mut()
    }

    /// Default mount point of the target
    pub fn body(&self) -> Option<NodeId> {
        self.target().body()
    }

    /// Serialized target
    pub fn html(&self) -> String {
        self.target().to_html()
    }

    // ------------------------------------------------------------------
    // Instances
    // ------------------------------------------------------------------

    pub fn registry(&self) -> Ref<'_, ComponentRegistry> {
        self.inner.registry.borrow()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, ComponentRegistry> {
        self.inner.registry.borrow_mut()
    }

    /// Create an instance of a defined class. `data` must be an object
    /// (or undefined); it is merged over the class defaults.
    pub fn create(
        &self,
        class: &str,
        data: Value,
        options: ComponentOptions,
    ) -> Result<Component, ComponentError> {
        let class = self
            .class(class)
            .ok_or_else(|| ComponentError::UnknownClass(class.to_string()))?;
        let data = expect_object("data", data)?;
        self.instantiate(class, data, options)
    }

    pub(crate) fn instantiate(
        &self,
        class: Rc<ComponentClass>,
        data: Map,
        options: ComponentOptions,
    ) -> Result<Component, ComponentError> {
        let mut initial = class.defaults().clone();
        initial.merge(data);

        let id = self.registry_mut().next_id();
        let component = Component::new(id, class, self.downgrade(), initial, options)?;
        self.registry_mut().register(component.clone());
        tracing::debug!("created {} #{}", component.class().name(), id);
        Ok(component)
    }

    /// Live instance by id
    pub fn by_sipa_id(&self, id: SipaId) -> Option<Component> {
        self.registry().get(id)
    }

    /// Live instance by id, only if it is exactly of class `class`
    pub fn by_sipa_id_of(&self, class: &str, id: SipaId) -> Option<Component> {
        self.by_sipa_id(id).filter(|c| c.class().name() == class)
    }

    /// Live instance whose rendered root carries `id="dom_id"`
    pub fn by_id(&self, dom_id: &str) -> Option<Component> {
        let id = {
            let target = self.target();
            let node = target.element_by_id(dom_id)?;
            target.attribute(node, ID_ATTRIBUTE)?.parse::<SipaId>().ok()?
        };
        self.by_sipa_id(id)
    }

    pub fn by_id_of(&self, class: &str, dom_id: &str) -> Option<Component> {
        self.by_id(dom_id).filter(|c| c.class().name() == class)
    }

    pub fn instances(&self) -> Vec<Component> {
        self.registry().instances()
    }

    pub fn instances_of(&self, class: &str) -> Vec<Component> {
        self.registry().instances_of(class)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Promote every registered tag already present in the target into a
    /// live instance, outermost first. Attributes become literal data,
    /// `attr-class` feeds the class list and inner markup becomes slot
    /// content.
    pub fn init(&self) -> Result<Vec<Component>, ComponentError> {
        let mut mounted = Vec::new();
        while let Some((node, class)) = self.next_declared() {
            let (attrs, content) = {
                let target = self.target();
                (target.attributes(node), target.inner_html(node))
            };

            let mut data = Map::new();
            let mut options = ComponentOptions::default();
            for (name, value) in attrs {
                match name.as_str() {
                    ID_ATTRIBUTE => {}
                    ALIAS_ATTRIBUTE => options.alias = Some(value),
                    CLASS_ATTRIBUTE => options.attr_classes = Some(value),
                    _ => {
                        data.insert(name, parse_literal(&value));
                    }
                }
            }
            if !content.trim().is_empty() {
                options.content = Some(content);
            }

            let component = self.instantiate(class, data, options)?;
            component.replace_with(node)?;
            mounted.push(component);
        }
        tracing::debug!("init mounted {} component(s)", mounted.len());
        Ok(mounted)
    }

    fn next_declared(&self) -> Option<(NodeId, Rc<ComponentClass>)> {
        let target = self.target();
        let classes = self.classes();
        target.elements().into_iter().find_map(|node| {
            if target.attribute(node, ID_ATTRIBUTE).is_some() {
                return None;
            }
            let tag = target.tag_name(node)?;
            classes.by_tag(&tag).map(|class| (node, class))
        })
    }

    /// Destroy every live instance, top-level ones first
    pub fn reset(&self) -> Result<(), ComponentError> {
        let roots: Vec<Component> = self
            .instances()
            .into_iter()
            .filter(|c| c.parent().is_none())
            .collect();
        for component in roots {
            if !component.is_destroyed() {
                component.destroy()?;
            }
        }

        let rest = self.instances();
        for component in rest {
            if !component.is_destroyed() {
                component.destroy()?;
            }
        }
        self.registry_mut().clear();
        tracing::debug!("app reset");
        Ok(())
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.inner.config)
            .field("classes", &self.inner.classes.borrow().len())
            .field("instances", &self.inner.registry.borrow().len())
            .finish()
    }
}
