//! Class attribute bookkeeping
//!
//! The class attribute of a component root is derived, not stored: it is
//! the template's classes plus `attr-class` classes plus classes added at
//! runtime, minus classes removed at runtime. Keeping the sources apart
//! lets a re-render pick up template changes without losing runtime edits.

/// Effective class set of one component
#[derive(Debug, Clone, Default)]
pub struct ClassList {
    template: Vec<String>,
    attribute: Vec<String>,
    added: Vec<String>,
    removed: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the classes given through `attr-class`
    pub fn with_attribute(classes: &str) -> Self {
        Self {
            attribute: split(classes),
            ..Self::default()
        }
    }

    /// Record the classes the template put on the root
    pub fn set_template(&mut self, classes: &str) {
        self.template = split(classes);
    }

    /// Add whitespace-separated classes
    pub fn add(&mut self, names: &str) {
        for name in split(names) {
            self.removed.retain(|n| *n != name);
            if !self.added.contains(&name) {
                self.added.push(name);
            }
        }
    }

    /// Remove whitespace-separated classes
    pub fn remove(&mut self, names: &str) {
        for name in split(names) {
            self.added.retain(|n| *n != name);
            if !self.removed.contains(&name) {
                self.removed.push(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve().iter().any(|n| n == name)
    }

    /// Effective classes in first-seen order, without duplicates
    pub fn resolve(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for name in self.template.iter().chain(&self.attribute).chain(&self.added) {
            if !self.removed.contains(name) && !classes.contains(name) {
                classes.push(name.clone());
            }
        }
        classes
    }

    /// Attribute value, `None` when there is nothing to write
    pub fn to_attribute(&self) -> Option<String> {
        let classes = self.resolve();
        if classes.is_empty() {
            None
        } else {
            Some(classes.join(" "))
        }
    }
}

fn split(names: &str) -> Vec<String> {
    names.split_ascii_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_combine() {
        let mut list = ClassList::with_attribute("wide  card");
        list.set_template("card box");
        assert_eq!(list.resolve(), vec!["card", "box", "wide"]);
        assert_eq!(list.to_attribute().as_deref(), Some("card box wide"));
    }

    #[test]
    fn test_remove_beats_template() {
        let mut list = ClassList::new();
        list.set_template("card");
        list.remove("card");
        assert!(!list.contains("card"));
        assert_eq!(list.to_attribute(), None);

        list.add("card");
        assert!(list.contains("card"));
    }

    #[test]
    fn test_add_many_once() {
        let mut list = ClassList::new();
        list.add("a b");
        list.add("b c");
        assert_eq!(list.resolve(), vec!["a", "b", "c"]);
    }
}
