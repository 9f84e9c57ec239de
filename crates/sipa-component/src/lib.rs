//! Sipa Component
//!
//! Template-driven components rendered into a DOM target. A component is
//! an instance of a registered [`ComponentClass`]; rendering calls the
//! class template, distributes slot content, stamps the root with a
//! `sipa-id` attribute and resolves nested component tags into live child
//! instances owned by the parent.

mod app;
mod class;
mod class_list;
mod component;
mod error;
mod registry;
mod render;
mod slots;
mod target;

pub use app::{App, AppConfig};
pub use class::{ClassRegistry, ComponentClass, TemplateContext, TemplateFn};
pub use class_list::ClassList;
pub use component::{Component, ComponentOptions, LifecycleEvent, UpdateOptions};
pub use error::ComponentError;
pub use registry::ComponentRegistry;
pub use target::{Placement, RenderTarget};

pub use sipa_events::{listener, Listener};

/// Instance identifier, unique within one [`App`]
pub type SipaId = u64;

/// Attribute stamped on every rendered component root
pub const ID_ATTRIBUTE: &str = "sipa-id";

/// Attribute naming a nested component inside its parent's data
pub const ALIAS_ATTRIBUTE: &str = "sipa-alias";

/// Attribute carrying extra classes for a nested component's root
pub const CLASS_ATTRIBUTE: &str = "attr-class";

/// Lifecycle hook names
pub mod hooks {
    pub const BEFORE_UPDATE: &str = "before_update";
    pub const AFTER_UPDATE: &str = "after_update";
    pub const BEFORE_DESTROY: &str = "before_destroy";
    pub const AFTER_DESTROY: &str = "after_destroy";

    pub const ALL: [&str; 4] = [BEFORE_UPDATE, AFTER_UPDATE, BEFORE_DESTROY, AFTER_DESTROY];
}
