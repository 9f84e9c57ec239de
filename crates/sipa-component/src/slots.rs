//! Slot distribution
//!
//! A template may contain `<slot>` placeholders: any number of named ones
//! and at most one unnamed one. Top-level content nodes carrying
//! `slot="name"` go to the matching named slot, everything else goes to
//! the unnamed slot. Placeholders are replaced by their content; a slot
//! without content renders as nothing.

use sipa_dom::{DomTree, Fragment, NodeId};

use crate::ComponentError;

/// Slot placeholder found in a template
struct SlotSite {
    node: NodeId,
    name: Option<String>,
}

/// Fill the slots of a rendered template with `content`.
///
/// `is_component_tag` marks nested component tags; slots inside them belong
/// to the nested component and are left alone. The template `root` is
/// exempt, since a template may be rooted at its own class's tag.
pub(crate) fn distribute(
    fragment: &mut Fragment,
    root: Option<NodeId>,
    content: &str,
    class: &str,
    is_component_tag: impl Fn(&str) -> bool,
) -> Result<(), ComponentError> {
    let sites = find_slots(fragment.tree(), fragment.root(), root, &is_component_tag);
    if sites.iter().filter(|s| s.name.is_none()).count() > 1 {
        return Err(ComponentError::MultipleDefaultSlots {
            class: class.to_string(),
        });
    }
    if sites.is_empty() {
        if !content.trim().is_empty() {
            tracing::warn!("{} has no slots, content dropped", class);
        }
        return Ok(());
    }

    let content = if content.is_empty() {
        Fragment::new()
    } else {
        sipa_html::parse_fragment(content)?
    };

    let mut named: Vec<(String, NodeId)> = Vec::new();
    let mut rest: Vec<NodeId> = Vec::new();
    for node in content.top_level() {
        match content.tree().attr(node, "slot") {
            Some(name) if !name.is_empty() => named.push((name.to_string(), node)),
            _ => rest.push(node),
        }
    }

    for (name, _) in &named {
        if !sites.iter().any(|s| s.name.as_deref() == Some(name.as_str())) {
            tracing::warn!("{} has no slot named '{}', content dropped", class, name);
        }
    }

    for site in sites {
        let nodes: Vec<NodeId> = match &site.name {
            Some(name) => named
                .iter()
                .filter(|(n, _)| n == name)
                .map(|(_, node)| *node)
                .collect(),
            None => rest.clone(),
        };
        fragment
            .tree_mut()
            .replace_with_imports(site.node, content.tree(), &nodes)?;
    }
    Ok(())
}

fn find_slots(
    tree: &DomTree,
    container: NodeId,
    root: Option<NodeId>,
    is_component_tag: &impl Fn(&str) -> bool,
) -> Vec<SlotSite> {
    let mut sites = Vec::new();
    let mut stack: Vec<NodeId> = tree.child_ids(container).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        let Some(tag) = tree.tag_name(node) else {
            continue;
        };
        if tag == "slot" {
            let name = tree
                .attr(node, "name")
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            sites.push(SlotSite { node, name });
            continue;
        }
        if Some(node) != root && is_component_tag(tag) {
            continue;
        }
        stack.extend(tree.child_ids(node).into_iter().rev());
    }
    sites
}
