//! Component errors

use sipa_codec::CodecError;
use sipa_dom::DomError;
use sipa_events::EventError;
use sipa_html::HtmlError;

use crate::SipaId;

#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("component {id} ({class}) is already destroyed")]
    AlreadyDestroyed { id: SipaId, class: String },

    #[error("nested <{tag}> in the {parent} template has no sipa-alias")]
    MissingAlias { tag: String, parent: String },

    #[error("duplicate sipa-alias '{alias}' in the {parent} template")]
    DuplicateAlias { alias: String, parent: String },

    #[error("the {class} template has more than one unnamed <slot>")]
    MultipleDefaultSlots { class: String },

    #[error("the {class} template rendered no root element")]
    EmptyTemplate { class: String },

    #[error("unknown component class '{0}'")]
    UnknownClass(String),

    #[error("invalid custom element name '{0}'")]
    InvalidTagName(String),

    #[error("component class '{0}' is already defined")]
    AlreadyDefined(String),

    #[error("invalid {param}: got {actual}, expected {expected}")]
    InvalidArgument {
        param: &'static str,
        actual: &'static str,
        expected: &'static str,
    },

    #[error("the owning app has been dropped")]
    AppDropped,

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl ComponentError {
    pub fn is_already_destroyed(&self) -> bool {
        matches!(self, ComponentError::AlreadyDestroyed { .. })
    }
}
