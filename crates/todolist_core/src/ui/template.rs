//! Named layout templates.
//!
//! Templates are pure builder functions: each call creates a fresh detached
//! subtree and returns its root. The registry keeps no per-call state.

use crate::ui::tree::{NodeId, UiError, UiResult, UiTree};
use std::collections::BTreeMap;

/// Template name of the task-list layout skeleton.
pub const TODOLIST_LAYOUT: &str = "todolist-layout";

/// Builder function producing one detached subtree.
pub type TemplateFn = fn(&mut UiTree) -> UiResult<NodeId>;

/// Registry of named templates.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateFn>,
}

impl Default for TemplateRegistry {
    /// Registry preloaded with [`TODOLIST_LAYOUT`].
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(TODOLIST_LAYOUT, build_todolist_layout);
        registry
    }
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Registers or replaces the template stored under `name`.
    pub fn register(&mut self, name: &str, template: TemplateFn) {
        self.templates.insert(name.to_string(), template);
    }

    /// Instantiates the template `name` into `tree` as a detached subtree.
    ///
    /// # Errors
    /// - `UnknownTemplate` when nothing is registered under `name`.
    pub fn clone_template(&self, tree: &mut UiTree, name: &str) -> UiResult<NodeId> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| UiError::UnknownTemplate(name.to_string()))?;
        template(tree)
    }
}

fn build_todolist_layout(tree: &mut UiTree) -> UiResult<NodeId> {
    let root = tree.create_element("div", &[("class", Some("todolist"))]);

    let form = tree.create_element("form", &[("class", Some("d-flex pb-4"))]);
    let input = tree.create_element(
        "input",
        &[
            ("type", Some("text")),
            ("name", Some("title")),
            ("class", Some("form-control")),
            ("placeholder", Some("New task")),
        ],
    );
    let add = tree.create_element(
        "button",
        &[("type", Some("submit")), ("class", Some("btn btn-primary"))],
    );
    tree.set_text(add, "Add")?;
    tree.append(form, input)?;
    tree.append(form, add)?;

    let group = tree.create_element("div", &[("class", Some("btn-group mb-4"))]);
    for (filter, label, class) in [
        ("all", "All", "btn btn-outline-primary active"),
        ("todo", "To do", "btn btn-outline-primary"),
        ("done", "Done", "btn btn-outline-primary"),
    ] {
        let button = tree.create_element(
            "button",
            &[("type", Some("button")), ("class", Some(class)), ("data-filter", Some(filter))],
        );
        tree.set_text(button, label)?;
        tree.append(group, button)?;
    }

    let list = tree.create_element("ul", &[("class", Some("list-group"))]);

    tree.append(root, form)?;
    tree.append(root, group)?;
    tree.append(root, list)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::{TemplateRegistry, TODOLIST_LAYOUT};
    use crate::ui::tree::{UiError, UiTree};

    #[test]
    fn layout_contains_form_filters_and_list() {
        let mut tree = UiTree::new();
        let root = TemplateRegistry::default()
            .clone_template(&mut tree, TODOLIST_LAYOUT)
            .expect("layout builds");

        let input = tree
            .query_selector(root, "form input[name=title]")
            .expect("valid selector");
        assert!(input.is_some());
        let buttons = tree
            .query_selector_all(root, ".btn-group button")
            .expect("valid selector");
        assert_eq!(buttons.len(), 3);
        assert!(tree.has_class(buttons[0], "active"));
        assert!(tree
            .query_selector(root, "ul.list-group")
            .expect("valid selector")
            .is_some());
    }

    #[test]
    fn each_instantiation_is_a_fresh_subtree() {
        let mut tree = UiTree::new();
        let registry = TemplateRegistry::default();
        let first = registry.clone_template(&mut tree, TODOLIST_LAYOUT).expect("first");
        let second = registry.clone_template(&mut tree, TODOLIST_LAYOUT).expect("second");
        assert_ne!(first, second);
        assert_eq!(tree.parent(first), None);
    }

    #[test]
    fn unknown_template_is_reported() {
        let mut tree = UiTree::new();
        let err = TemplateRegistry::empty()
            .clone_template(&mut tree, TODOLIST_LAYOUT)
            .unwrap_err();
        assert_eq!(err, UiError::UnknownTemplate(TODOLIST_LAYOUT.to_string()));
    }
}
