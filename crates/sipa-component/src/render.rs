//! Rendering
//!
//! Turning an instance into markup:
//!
//! 1. call the class template with the current data
//! 2. parse it; the first element is the root
//! 3. distribute slot content into `<slot>` placeholders
//! 4. write the effective class attribute and the hidden style
//! 5. resolve nested component tags into child instances, splicing each
//!    child's own rendering in place of its tag
//! 6. stamp the root with `sipa-id`
//!
//! Children are reused across renders as long as the parent's data still
//! holds a live handle of the same class under the tag's alias, which keeps
//! their identity and listeners stable across updates. A reused child picks
//! up inline attribute values that changed since the previous render.

use std::rc::Rc;

use sipa_codec::{parse_literal, Map, Value};
use sipa_dom::{inner_html, DomTree, Fragment, NodeId};

use crate::class::{ClassRegistry, TemplateContext};
use crate::component::RenderInputs;
use crate::{
    slots, App, Component, ComponentClass, ComponentError, ComponentOptions, RenderTarget,
    SipaId, ALIAS_ATTRIBUTE, CLASS_ATTRIBUTE, ID_ATTRIBUTE,
};

/// Style fragment written on hidden roots
pub(crate) const HIDDEN_STYLE: &str = "display: none;";

/// Nested component tag found in a template
struct NestedTag {
    node: NodeId,
    class: Rc<ComponentClass>,
    alias: String,
    /// Literal-evaluated inline attributes
    attributes: Map,
    attr_classes: Option<String>,
    content: String,
}

pub(crate) fn render(component: &Component, app: &App) -> Result<Fragment, ComponentError> {
    let RenderInputs {
        data,
        alias,
        content,
        hidden,
    } = component.render_inputs()?;
    let class = component.class().clone();

    let markup = class.render_template(&TemplateContext {
        id: component.id(),
        alias: alias.as_deref(),
        data: &data,
    });
    let mut fragment = sipa_html::parse_fragment(&markup)?;

    {
        let classes = app.classes();
        let template_root = fragment.first_element();
        slots::distribute(
            &mut fragment,
            template_root,
            content.as_deref().unwrap_or(""),
            class.name(),
            |tag| classes.by_tag(tag).is_some(),
        )?;
    }

    let root = fragment.first_element().ok_or_else(|| ComponentError::EmptyTemplate {
        class: class.name().to_string(),
    })?;

    let template_classes = fragment.tree().attr(root, "class").unwrap_or("").to_string();
    let class_attr = component.resolve_classes(&template_classes);
    let tree = fragment.tree_mut();
    match class_attr {
        Some(value) => tree.set_attr(root, "class", value)?,
        None => {
            tree.remove_attr(root, "class")?;
        }
    }
    if hidden {
        if let Some(style) = visibility_style(tree.attr(root, "style"), true) {
            tree.set_attr(root, "style", style)?;
        }
    }

    resolve_children(component, app, &mut fragment, root, &data)?;
    fragment
        .tree_mut()
        .set_attr(root, ID_ATTRIBUTE, component.id().to_string())?;

    tracing::trace!("rendered {} #{}", class.name(), component.id());
    Ok(fragment)
}

fn resolve_children(
    parent: &Component,
    app: &App,
    fragment: &mut Fragment,
    root: NodeId,
    data: &Map,
) -> Result<(), ComponentError> {
    let found = {
        let classes = app.classes();
        find_nested(fragment.tree(), fragment.root(), root, &classes)
    };

    // Validate every alias before creating anything
    let mut tags: Vec<NestedTag> = Vec::with_capacity(found.len());
    for (node, class) in found {
        let tree = fragment.tree();
        let alias = tree
            .attr(node, ALIAS_ATTRIBUTE)
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string);
        let Some(alias) = alias else {
            return Err(ComponentError::MissingAlias {
                tag: class.tag().to_string(),
                parent: parent.class().name().to_string(),
            });
        };
        if tags.iter().any(|t| t.alias == alias) {
            return Err(ComponentError::DuplicateAlias {
                alias,
                parent: parent.class().name().to_string(),
            });
        }
        let mut attributes = Map::new();
        let mut attr_classes = None;
        if let Some(element) = tree.get(node).and_then(|n| n.as_element()) {
            for attr in &element.attrs {
                match attr.name.as_str() {
                    ALIAS_ATTRIBUTE | ID_ATTRIBUTE => {}
                    CLASS_ATTRIBUTE => attr_classes = Some(attr.value.clone()),
                    name => {
                        attributes.insert(name, parse_literal(&attr.value));
                    }
                }
            }
        }
        let content = inner_html(tree, node);
        tags.push(NestedTag {
            node,
            class,
            alias,
            attributes,
            attr_classes,
            content,
        });
    }

    let mut kept: Vec<SipaId> = Vec::with_capacity(tags.len());
    for tag in &tags {
        let child = match live_child(parent, app, data, tag) {
            Some(child) => {
                child.apply_attributes(tag.attributes.clone());
                child
            }
            None => create_child(parent, app, data, tag)?,
        };
        let rendered = render(&child, app)?;
        fragment.splice(tag.node, &rendered)?;
        parent.bind_child(&tag.alias, child.id());
        kept.push(child.id());
    }

    if app.config().prune_orphaned_children {
        let stale: Vec<Component> = app
            .registry()
            .children_of(parent.id())
            .into_iter()
            .filter(|child| !kept.contains(&child.id()))
            .collect();
        for child in stale {
            tracing::debug!(
                "{} #{} no longer renders '{}', destroying it",
                parent.class().name(),
                parent.id(),
                child.alias().unwrap_or_default()
            );
            child.destroy()?;
        }
    }
    Ok(())
}

/// Existing child stored under the tag's alias, if still usable
fn live_child(parent: &Component, app: &App, data: &Map, tag: &NestedTag) -> Option<Component> {
    let handle = data.get(&tag.alias)?.as_handle()?;
    let child = app.by_sipa_id(handle.0)?;
    let usable = child.class().name() == tag.class.name() && child.parent_id() == Some(parent.id());
    usable.then_some(child)
}

fn create_child(
    parent: &Component,
    app: &App,
    data: &Map,
    tag: &NestedTag,
) -> Result<Component, ComponentError> {
    let mut seed = tag.attributes.clone();
    let mut options = ComponentOptions {
        alias: Some(tag.alias.clone()),
        attr_classes: tag.attr_classes.clone(),
        parent: Some(parent.id()),
        attributes: tag.attributes.clone(),
        ..ComponentOptions::default()
    };
    if let Some(Value::Object(fields)) = data.get(&tag.alias) {
        seed.merge(fields.clone());
    }
    if !tag.content.trim().is_empty() {
        options.content = Some(tag.content.clone());
    }

    tracing::debug!(
        "{} #{} creates <{}> as '{}'",
        parent.class().name(),
        parent.id(),
        tag.class.tag(),
        tag.alias
    );
    app.instantiate(tag.class.clone(), seed, options)
}

/// Top-most registered component tags below `container`, skipping
/// already rendered instances and the template root itself
fn find_nested(
    tree: &DomTree,
    container: NodeId,
    root: NodeId,
    classes: &ClassRegistry,
) -> Vec<(NodeId, Rc<ComponentClass>)> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = tree.child_ids(container).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        let Some(tag) = tree.tag_name(node) else {
            continue;
        };
        if node != root {
            if tree.attr(node, ID_ATTRIBUTE).is_some() {
                continue;
            }
            if let Some(class) = classes.by_tag(tag) {
                found.push((node, class));
                continue;
            }
        }
        stack.extend(tree.child_ids(node).into_iter().rev());
    }
    found
}

/// Ids of the nearest rendered instances below a live occurrence
pub(crate) fn nested_ids(target: &dyn RenderTarget, occurrence: NodeId) -> Vec<SipaId> {
    let mut ids = Vec::new();
    let mut stack: Vec<NodeId> = target.children(occurrence).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        let id = target
            .attribute(node, ID_ATTRIBUTE)
            .and_then(|value| value.parse::<SipaId>().ok());
        match id {
            Some(id) => ids.push(id),
            None => stack.extend(target.children(node).into_iter().rev()),
        }
    }
    ids
}

/// Style attribute with the hidden marker added or stripped.
/// `None` means the attribute should be removed.
pub(crate) fn visibility_style(current: Option<&str>, hidden: bool) -> Option<String> {
    let stripped = current.unwrap_or("").replace(HIDDEN_STYLE, "");
    let base = stripped.trim();
    let style = match (hidden, base.is_empty()) {
        (false, _) => base.to_string(),
        (true, true) => HIDDEN_STYLE.to_string(),
        (true, false) if base.ends_with(';') => format!("{} {}", base, HIDDEN_STYLE),
        (true, false) => format!("{}; {}", base, HIDDEN_STYLE),
    };
    (!style.is_empty()).then_some(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_style() {
        assert_eq!(visibility_style(None, true).as_deref(), Some("display: none;"));
        assert_eq!(visibility_style(None, false), None);
        assert_eq!(
            visibility_style(Some("color: red"), true).as_deref(),
            Some("color: red; display: none;")
        );
        assert_eq!(
            visibility_style(Some("color: red; display: none;"), false).as_deref(),
            Some("color: red;")
        );
        assert_eq!(visibility_style(Some("display: none;"), false), None);
    }
}
