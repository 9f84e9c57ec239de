//! Sipa
//!
//! Template-driven UI components rendered into a headless DOM, with a
//! storage-safe value codec and per-component events.
//!
//! # Example
//! ```rust,ignore
//! use sipa::{App, ComponentClass, ComponentOptions, Value};
//!
//! let app = App::headless();
//! app.define(ComponentClass::new("Greeting", "x-greeting", |ctx| {
//!     format!("<p>Hello {}</p>", ctx.text("name"))
//! }))?;
//! let greeting = app.create("Greeting", Value::Undefined, ComponentOptions::new())?;
//! greeting.append(app.body().unwrap())?;
//! ```

mod config;
mod logging;

pub use config::{Config, ConfigError, LogConfig, StorageConfig};
pub use logging::{init_logging, LOG_ENV};

pub use sipa_codec::{deserialize, serialize, Map, Value};
pub use sipa_component::{
    hooks, listener, App, AppConfig, Component, ComponentClass, ComponentError, ComponentOptions,
    LifecycleEvent, Listener, TemplateContext, UpdateOptions,
};
pub use sipa_state::{StateError, Storage};

// Re-export sub-crates for advanced usage
pub use sipa_codec as codec;
pub use sipa_component as component;
pub use sipa_dom as dom;
pub use sipa_events as events;
pub use sipa_html as html;
pub use sipa_state as state;

/// Sipa version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// App over an empty document at the configured URL
pub fn app_from_config(config: &Config) -> App {
    let document = sipa_dom::Document::new(&config.document_url);
    App::with_config(document, config.app_config())
}

/// Local storage when a path is configured, session storage otherwise
pub fn storage_from_config(config: &Config) -> Result<Storage, StateError> {
    match &config.storage.local_path {
        Some(path) => Storage::local(path),
        None => Ok(Storage::session()),
    }
}
