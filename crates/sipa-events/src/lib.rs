//! Sipa Events
//!
//! Per-owner named-event pub/sub. A bus is created with a fixed set of valid
//! event names; listeners are identified by their `Rc` allocation, so
//! subscribing the same listener twice to one event keeps a single entry.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Event listener. Receives the trigger arguments and may mutate them.
pub type Listener<A> = Rc<dyn Fn(&mut A) -> anyhow::Result<()>>;

/// Wrap a closure as a listener
pub fn listener<A, F>(f: F) -> Listener<A>
where
    F: Fn(&mut A) -> anyhow::Result<()> + 'static,
{
    Rc::new(f)
}

/// Event bus errors
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("an event bus needs at least one event name")]
    NoEventNames,

    #[error("duplicate event name '{0}'")]
    DuplicateEventName(String),

    #[error("invalid event '{name}', valid events are: {}", valid.join(", "))]
    InvalidEventName { name: String, valid: Vec<String> },

    #[error("listener for '{name}' failed: {error}")]
    Listener { name: String, error: anyhow::Error },
}

/// Trigger behaviour
#[derive(Debug, Clone, Copy)]
pub struct TriggerOptions {
    /// Reject names outside the valid set
    pub validate: bool,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// Named-event registry
pub struct EventBus<A> {
    names: Vec<String>,
    registry: HashMap<String, Vec<Listener<A>>>,
}

impl<A> EventBus<A> {
    /// Create a bus accepting exactly `names`
    pub fn new<I, S>(names: I) -> Result<Self, EventError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut bus = Self {
            names: Vec::new(),
            registry: HashMap::new(),
        };
        for name in names {
            let name = name.into();
            if bus.is_valid(&name) {
                return Err(EventError::DuplicateEventName(name));
            }
            bus.names.push(name);
        }
        if bus.names.is_empty() {
            return Err(EventError::NoEventNames);
        }
        Ok(bus)
    }

    /// Valid event names in declaration order
    pub fn event_names(&self) -> &[String] {
        &self.names
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn validate(&self, name: &str) -> Result<(), EventError> {
        if self.is_valid(name) {
            Ok(())
        } else {
            Err(EventError::InvalidEventName {
                name: name.to_string(),
                valid: self.names.clone(),
            })
        }
    }

    /// Extend the valid set; an already valid name is left as is
    pub fn add_event_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.is_valid(&name) {
            self.names.push(name);
        }
    }

    /// Shrink the valid set, dropping the name's listeners with it
    pub fn remove_event_name(&mut self, name: &str) {
        self.names.retain(|n| n != name);
        self.registry.remove(name);
    }

    /// Subscribe a listener. The same listener twice is a no-op.
    pub fn subscribe(&mut self, name: &str, listener: Listener<A>) -> Result<(), EventError> {
        self.validate(name)?;
        let listeners = self.registry.entry(name.to_string()).or_default();
        if listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            tracing::warn!("listener already subscribed to '{}', ignoring", name);
            return Ok(());
        }
        listeners.push(listener);
        Ok(())
    }

    /// Remove one subscription. Unknown names or listeners only warn.
    pub fn unsubscribe(&mut self, name: &str, listener: &Listener<A>) {
        if !self.is_valid(name) {
            tracing::warn!("cannot unsubscribe from invalid event '{}'", name);
            return;
        }
        let Some(listeners) = self.registry.get_mut(name) else {
            tracing::warn!("listener was never subscribed to '{}'", name);
            return;
        };
        let before = listeners.len();
        listeners.retain(|l| !Rc::ptr_eq(l, listener));
        if listeners.len() == before {
            tracing::warn!("listener was never subscribed to '{}'", name);
        }
    }

    /// Remove every listener of one event
    pub fn unsubscribe_all(&mut self, name: &str) {
        self.registry.remove(name);
    }

    /// Remove every listener, keeping the valid names
    pub fn reset(&mut self) {
        self.registry.clear();
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.registry.get(name).map(Vec::len).unwrap_or(0)
    }

    /// Snapshot of an event's listeners in subscription order
    pub fn listeners(&self, name: &str) -> Vec<Listener<A>> {
        self.registry.get(name).cloned().unwrap_or_default()
    }

    /// Validate and snapshot in one step, for owners that must release
    /// their borrow of the bus before listeners run
    pub fn prepare(&self, name: &str, options: TriggerOptions) -> Result<Vec<Listener<A>>, EventError> {
        if options.validate {
            self.validate(name)?;
        }
        Ok(self.listeners(name))
    }

    /// Fire an event
    pub fn trigger(&self, name: &str, args: &mut A) -> Result<(), EventError> {
        self.trigger_with(name, args, TriggerOptions::default())
    }

    pub fn trigger_with(&self, name: &str, args: &mut A, options: TriggerOptions) -> Result<(), EventError> {
        let listeners = self.prepare(name, options)?;
        dispatch(name, &listeners, args)
    }
}

/// Run a listener snapshot in order, stopping at the first failure
pub fn dispatch<A>(name: &str, listeners: &[Listener<A>], args: &mut A) -> Result<(), EventError> {
    tracing::trace!("dispatching '{}' to {} listener(s)", name, listeners.len());
    for listener in listeners {
        listener(args).map_err(|error| EventError::Listener {
            name: name.to_string(),
            error,
        })?;
    }
    Ok(())
}

impl<A> fmt::Debug for EventBus<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .registry
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("names", &self.names)
            .field("listeners", &counts)
            .finish()
    }
}
