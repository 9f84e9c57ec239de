//! Component instances
//!
//! A [`Component`] is a cheap handle to one live instance. It owns the
//! instance data, class list, visibility and event bus; DOM occurrences
//! are never stored but found through the `sipa-id` attribute, so every
//! copy mounted with `append`/`prepend`/`replace_with` stays in sync.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use sipa_codec::{Handle, Map, Value};
use sipa_dom::{Fragment, NodeId};
use sipa_events::{dispatch, EventBus, Listener, TriggerOptions};

use crate::app::AppInner;
use crate::render::{self, visibility_style};
use crate::{hooks, App, ClassList, ComponentClass, ComponentError, Placement, SipaId, ID_ATTRIBUTE};

/// Construction options
#[derive(Debug, Clone, Default)]
pub struct ComponentOptions {
    /// Markup distributed into the template's slots
    pub content: Option<String>,
    /// Name under which a parent stores this instance
    pub alias: Option<String>,
    /// Extra classes for the root element
    pub attr_classes: Option<String>,
    pub(crate) parent: Option<SipaId>,
    /// Inline attribute data the parent template created this instance with
    pub(crate) attributes: Map,
}

impl ComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.attr_classes = Some(classes.into());
        self
    }
}

/// Update behaviour
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Start from the class defaults instead of the current data.
    /// Child references are kept either way.
    pub reset: bool,
}

/// Argument passed to lifecycle and custom event listeners
pub struct LifecycleEvent {
    pub component: Component,
    pub name: String,
    /// Pending data for `before_update` (listeners may edit it), current
    /// data otherwise, `None` after destruction
    pub data: Option<Map>,
    pub options: UpdateOptions,
    /// Arguments of a custom `trigger`
    pub args: Vec<Value>,
}

impl fmt::Debug for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleEvent")
            .field("component", &self.component.id())
            .field("name", &self.name)
            .field("data", &self.data)
            .field("args", &self.args)
            .finish()
    }
}

/// Handle to a component instance
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

struct ComponentInner {
    id: SipaId,
    class: Rc<ComponentClass>,
    app: Weak<AppInner>,
    state: RefCell<State>,
}

struct State {
    alias: Option<String>,
    parent: Option<SipaId>,
    /// `None` once destroyed
    data: Option<Map>,
    content: Option<String>,
    classes: ClassList,
    hidden: bool,
    events: EventBus<LifecycleEvent>,
    /// Inline attribute data seen at the last parent render
    attributes: Map,
}

/// Snapshot taken before a template call
pub(crate) struct RenderInputs {
    pub data: Map,
    pub alias: Option<String>,
    pub content: Option<String>,
    pub hidden: bool,
}

impl Component {
    pub(crate) fn new(
        id: SipaId,
        class: Rc<ComponentClass>,
        app: Weak<AppInner>,
        data: Map,
        options: ComponentOptions,
    ) -> Result<Self, ComponentError> {
        let names = hooks::ALL
            .iter()
            .map(|name| name.to_string())
            .chain(class.events().iter().cloned());
        let events = EventBus::new(names)?;
        let classes = options
            .attr_classes
            .as_deref()
            .map(ClassList::with_attribute)
            .unwrap_or_default();

        Ok(Self {
            inner: Rc::new(ComponentInner {
                id,
                class,
                app,
                state: RefCell::new(State {
                    alias: options.alias,
                    parent: options.parent,
                    data: Some(data),
                    content: options.content,
                    classes,
                    hidden: false,
                    events,
                    attributes: options.attributes,
                }),
            }),
        })
    }

    #[inline]
    pub fn id(&self) -> SipaId {
        self.inner.id
    }

    pub fn class(&self) -> &Rc<ComponentClass> {
        &self.inner.class
    }

    /// Whether both handles point to the same instance
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_destroyed(&self) -> bool {
        self.state().data.is_none()
    }

    pub fn alias(&self) -> Option<String> {
        self.state().alias.clone()
    }

    pub(crate) fn parent_id(&self) -> Option<SipaId> {
        self.state().parent
    }

    /// Owning component, if this one was created from a nested tag
    pub fn parent(&self) -> Option<Component> {
        let parent = self.parent_id()?;
        self.app().ok()?.by_sipa_id(parent)
    }

    /// Slot content given at construction
    pub fn content(&self) -> Option<String> {
        self.state().content.clone()
    }

    fn state(&self) -> Ref<'_, State> {
        self.inner.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, State> {
        self.inner.state.borrow_mut()
    }

    fn app(&self) -> Result<App, ComponentError> {
        self.inner
            .app
            .upgrade()
            .map(App::from_inner)
            .ok_or(ComponentError::AppDropped)
    }

    fn ensure_active(&self) -> Result<(), ComponentError> {
        if self.is_destroyed() {
            return Err(ComponentError::AlreadyDestroyed {
                id: self.id(),
                class: self.class().name().to_string(),
            });
        }
        Ok(())
    }

    /// Copy of the instance data. Child components appear as handles.
    pub fn data(&self) -> Result<Map, ComponentError> {
        self.ensure_active()?;
        Ok(self.state().data.clone().unwrap_or_default())
    }

    /// One data field
    pub fn get(&self, key: &str) -> Result<Option<Value>, ComponentError> {
        self.ensure_active()?;
        Ok(self.state().data.as_ref().and_then(|d| d.get(key)).cloned())
    }

    /// Live children by alias, in data order
    pub fn children(&self) -> Result<Vec<(String, Component)>, ComponentError> {
        let data = self.data()?;
        let app = self.app()?;
        let children = data
            .iter()
            .filter_map(|(alias, value)| {
                let handle = value.as_handle()?;
                let child = app.by_sipa_id(handle.0)?;
                Some((alias.to_string(), child))
            })
            .collect();
        Ok(children)
    }

    pub fn child(&self, alias: &str) -> Result<Option<Component>, ComponentError> {
        let handle = self.get(alias)?.and_then(|v| v.as_handle());
        match handle {
            Some(handle) => Ok(self.app()?.by_sipa_id(handle.0)),
            None => Ok(None),
        }
    }

    pub(crate) fn render_inputs(&self) -> Result<RenderInputs, ComponentError> {
        self.ensure_active()?;
        let state = self.state();
        Ok(RenderInputs {
            data: state.data.clone().unwrap_or_default(),
            alias: state.alias.clone(),
            content: state.content.clone(),
            hidden: state.hidden,
        })
    }

    /// Record the template classes and return the class attribute to write
    pub(crate) fn resolve_classes(&self, template: &str) -> Option<String> {
        let mut state = self.state_mut();
        state.classes.set_template(template);
        state.classes.to_attribute()
    }

    /// Store a child reference under its alias
    pub(crate) fn bind_child(&self, alias: &str, child: SipaId) {
        if let Some(data) = self.state_mut().data.as_mut() {
            data.insert(alias, Value::Handle(Handle(child)));
        }
    }

    /// Write inline attribute values from the parent template. Only values
    /// that changed since the previous parent render are written, so data
    /// given to the child directly survives unrelated parent renders. No
    /// hooks fire; child references are never overwritten.
    pub(crate) fn apply_attributes(&self, attributes: Map) {
        let mut state = self.state_mut();
        let State {
            data,
            attributes: previous,
            ..
        } = &mut *state;
        if let Some(data) = data.as_mut() {
            for (key, value) in attributes.iter() {
                if previous.get(key) == Some(value) {
                    continue;
                }
                if data.get(key).is_some_and(Value::is_handle) {
                    continue;
                }
                tracing::trace!("attribute '{}' changed on #{}", key, self.inner.id);
                data.insert(key, value.clone());
            }
        }
        *previous = attributes;
    }

    /// Drop the alias entry if it still points at `child`
    fn forget_child(&self, alias: &str, child: SipaId) {
        let mut state = self.state_mut();
        if let Some(data) = state.data.as_mut() {
            if data.get(alias).and_then(Value::as_handle) == Some(Handle(child)) {
                data.remove(alias);
            }
        }
    }

    /// Live DOM nodes rendered for this instance
    fn occurrences(&self, app: &App) -> Vec<NodeId> {
        app.target()
            .elements_with_attribute(ID_ATTRIBUTE, &self.id().to_string())
    }

    // ------------------------------------------------------------------
    // Rendering and placement
    // ------------------------------------------------------------------

    /// Rendered markup. Rendering twice without changes yields the same string.
    pub fn html(&self) -> Result<String, ComponentError> {
        Ok(self.node()?.to_html())
    }

    /// Rendered fragment, detached from the target
    pub fn node(&self) -> Result<Fragment, ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;
        render::render(self, &app)
    }

    /// Every live occurrence in the target
    pub fn element(&self) -> Result<Vec<NodeId>, ComponentError> {
        self.ensure_active()?;
        Ok(self.occurrences(&self.app()?))
    }

    /// Attribute selector matching every occurrence
    pub fn selector(&self) -> Result<String, ComponentError> {
        self.ensure_active()?;
        Ok(format!("[{}=\"{}\"]", ID_ATTRIBUTE, self.id()))
    }

    /// Render and insert as the last children of `target`
    pub fn append(&self, target: NodeId) -> Result<Vec<NodeId>, ComponentError> {
        self.place(target, Placement::Append)
    }

    /// Render and insert as the first children of `target`
    pub fn prepend(&self, target: NodeId) -> Result<Vec<NodeId>, ComponentError> {
        self.place(target, Placement::Prepend)
    }

    /// Render and insert in place of `target`
    pub fn replace_with(&self, target: NodeId) -> Result<Vec<NodeId>, ComponentError> {
        self.place(target, Placement::Replace)
    }

    fn place(&self, anchor: NodeId, placement: Placement) -> Result<Vec<NodeId>, ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;
        let fragment = render::render(self, &app)?;
        let inserted = app.target_mut().insert(anchor, placement, &fragment)?;
        tracing::debug!("mounted {} #{} ({:?})", self.class().name(), self.id(), placement);
        self.sync_nested_references()?;
        Ok(inserted)
    }

    fn rerender(&self, app: &App) -> Result<(), ComponentError> {
        let fragment = render::render(self, app)?;
        let nodes = self.occurrences(app);
        for node in &nodes {
            app.target_mut().insert(*node, Placement::Replace, &fragment)?;
        }
        tracing::debug!("re-rendered {} #{} in {} place(s)", self.class().name(), self.id(), nodes.len());
        Ok(())
    }

    /// Re-bind every alias to the instance rendered under it, walking all
    /// live occurrences. Never creates instances.
    pub fn sync_nested_references(&self) -> Result<(), ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;
        let mut seen: Vec<SipaId> = Vec::new();
        for occurrence in self.occurrences(&app) {
            let ids = render::nested_ids(&**app.target(), occurrence);
            for id in ids {
                if seen.contains(&id) {
                    continue;
                }
                seen.push(id);
                let Some(child) = app.by_sipa_id(id) else {
                    continue;
                };
                if child.parent_id() != Some(self.id()) {
                    continue;
                }
                if let Some(alias) = child.alias() {
                    self.bind_child(&alias, id);
                }
                child.sync_nested_references()?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Update and destroy
    // ------------------------------------------------------------------

    /// Shallow-merge `partial` into the data and re-render
    pub fn update(&self, partial: Value) -> Result<(), ComponentError> {
        self.update_with(partial, UpdateOptions::default())
    }

    pub fn update_with(&self, partial: Value, options: UpdateOptions) -> Result<(), ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;
        let partial = expect_object("data", partial)?;

        let current = self.data()?;
        let mut pending = if options.reset {
            let mut base = self.class().defaults().clone();
            for (key, value) in current.iter() {
                if value.is_handle() {
                    base.insert(key, value.clone());
                }
            }
            base
        } else {
            current
        };
        pending.merge(partial);

        let mut event = self.event(hooks::BEFORE_UPDATE, Some(pending), options);
        self.emit(&mut event)?;
        let pending = event.data.take().unwrap_or_default();

        self.commit(&app, pending)?;
        self.rerender(&app)?;
        self.sync_nested_references()?;

        let mut event = self.event(hooks::AFTER_UPDATE, Some(self.data()?), options);
        self.emit(&mut event)
    }

    /// Replace the data with `pending`. Objects written over a child alias
    /// update that child instead of replacing the reference.
    fn commit(&self, app: &App, pending: Map) -> Result<(), ComponentError> {
        let current = self.data()?;
        let mut next = Map::new();
        let mut forwarded = Vec::new();
        for (key, value) in pending {
            let child = current
                .get(&key)
                .and_then(Value::as_handle)
                .and_then(|handle| app.by_sipa_id(handle.0));
            match (child, value) {
                (Some(child), Value::Object(fields)) => {
                    next.insert(key, Value::Handle(Handle(child.id())));
                    forwarded.push((child, fields));
                }
                (_, value) => {
                    next.insert(key, value);
                }
            }
        }
        self.state_mut().data = Some(next);

        for (child, fields) in forwarded {
            child.update(Value::Object(fields))?;
        }
        Ok(())
    }

    /// Tear the instance down: children first, then every DOM occurrence.
    /// Terminal; most methods fail afterwards.
    pub fn destroy(&self) -> Result<(), ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;

        let mut event = self.event(hooks::BEFORE_DESTROY, Some(self.data()?), UpdateOptions::default());
        self.emit(&mut event)?;

        let children = app.registry().children_of(self.id());
        for child in children {
            if !child.is_destroyed() {
                child.destroy()?;
            }
        }

        for node in self.occurrences(&app) {
            app.target_mut().remove(node)?;
        }
        app.registry_mut().deregister(self.id());
        self.state_mut().data = None;

        if let (Some(parent), Some(alias)) = (self.parent(), self.alias()) {
            parent.forget_child(&alias, self.id());
        }
        tracing::debug!("destroyed {} #{}", self.class().name(), self.id());

        let mut event = self.event(hooks::AFTER_DESTROY, None, UpdateOptions::default());
        let result = self.emit(&mut event);
        self.state_mut().events.reset();
        result
    }

    // ------------------------------------------------------------------
    // Visibility and classes
    // ------------------------------------------------------------------

    pub fn hide(&self) -> Result<(), ComponentError> {
        self.set_hidden(true)
    }

    pub fn show(&self) -> Result<(), ComponentError> {
        self.set_hidden(false)
    }

    fn set_hidden(&self, hidden: bool) -> Result<(), ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;
        self.state_mut().hidden = hidden;
        for node in self.occurrences(&app) {
            let current = app.target().attribute(node, "style");
            match visibility_style(current.as_deref(), hidden) {
                Some(style) => app.target_mut().set_attribute(node, "style", &style)?,
                None => app.target_mut().remove_attribute(node, "style")?,
            }
        }
        Ok(())
    }

    /// Mounted somewhere and not hidden
    pub fn is_visible(&self) -> Result<bool, ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;
        Ok(!self.state().hidden && !self.occurrences(&app).is_empty())
    }

    /// Add whitespace-separated classes to the root of every occurrence
    pub fn add_class(&self, names: &str) -> Result<(), ComponentError> {
        self.edit_classes(|classes| classes.add(names))
    }

    /// Remove whitespace-separated classes, template classes included
    pub fn remove_class(&self, names: &str) -> Result<(), ComponentError> {
        self.edit_classes(|classes| classes.remove(names))
    }

    pub fn has_class(&self, name: &str) -> Result<bool, ComponentError> {
        self.ensure_active()?;
        Ok(self.state().classes.contains(name))
    }

    /// Effective classes of the root element
    pub fn classes(&self) -> Result<Vec<String>, ComponentError> {
        self.ensure_active()?;
        Ok(self.state().classes.resolve())
    }

    fn edit_classes(&self, edit: impl FnOnce(&mut ClassList)) -> Result<(), ComponentError> {
        self.ensure_active()?;
        let app = self.app()?;
        let value = {
            let mut state = self.state_mut();
            edit(&mut state.classes);
            state.classes.to_attribute()
        };
        for node in self.occurrences(&app) {
            match &value {
                Some(value) => app.target_mut().set_attribute(node, "class", value)?,
                None => app.target_mut().remove_attribute(node, "class")?,
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Listen to a lifecycle hook or a class-declared event
    pub fn subscribe(&self, name: &str, listener: Listener<LifecycleEvent>) -> Result<(), ComponentError> {
        self.ensure_active()?;
        self.state_mut().events.subscribe(name, listener)?;
        Ok(())
    }

    pub fn unsubscribe(&self, name: &str, listener: &Listener<LifecycleEvent>) {
        self.state_mut().events.unsubscribe(name, listener);
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.state().events.listener_count(name)
    }

    /// Fire a custom event with arguments
    pub fn trigger(&self, name: &str, args: Vec<Value>) -> Result<(), ComponentError> {
        self.ensure_active()?;
        let validate = self.app()?.config().validate_custom_triggers;
        let mut event = self.event(name, Some(self.data()?), UpdateOptions::default());
        event.args = args;
        let listeners = self.state().events.prepare(name, TriggerOptions { validate })?;
        dispatch(name, &listeners, &mut event)?;
        Ok(())
    }

    fn event(&self, name: &str, data: Option<Map>, options: UpdateOptions) -> LifecycleEvent {
        LifecycleEvent {
            component: self.clone(),
            name: name.to_string(),
            data,
            options,
            args: Vec::new(),
        }
    }

    /// Dispatch without holding the state borrow, so listeners may call back in
    fn emit(&self, event: &mut LifecycleEvent) -> Result<(), ComponentError> {
        let name = event.name.clone();
        let listeners = self.state().events.prepare(&name, TriggerOptions::default())?;
        dispatch(&name, &listeners, event)?;
        Ok(())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id())
            .field("class", &self.class().name())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Accept an object, treating `undefined` as an empty one
pub(crate) fn expect_object(param: &'static str, value: Value) -> Result<Map, ComponentError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Undefined => Ok(Map::new()),
        other => Err(ComponentError::InvalidArgument {
            param,
            actual: other.type_name(),
            expected: "object",
        }),
    }
}
