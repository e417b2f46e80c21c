//! View for one todo.
//!
//! # Responsibility
//! - Render one todo as `li > (checkbox, label, delete button)`.
//! - Translate checkbox changes into `toggle` events and delete clicks into
//!   cancelable `delete` events, both bubbling toward the list owner.
//!
//! # Invariants
//! - The view never mutates its todo; only the event receiver does.
//! - `Removed` is terminal: no toggle emission, no second removal.
//! - A vetoed removal leaves the node attached and the state unchanged.
//! - Removal drops every listener registered on the root and its controls.

use crate::model::todo::{TodoHandle, TodoId};
use crate::ui::event::{Document, Event, EventKind};
use crate::ui::tree::{NodeId, UiResult};
use log::{debug, error, info};
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Class set on the item root while it renders as completed.
pub const COMPLETED_CLASS: &str = "is-completed";

/// Whether the item is still part of the rendered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Removed,
}

/// Outcome of a removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// No listener vetoed; the node was detached.
    Removed,
    /// A listener cancelled the `delete` event; nothing changed.
    Vetoed,
    /// The view had already been removed; no event was emitted.
    AlreadyRemoved,
}

struct ItemViewInner {
    document: Document,
    todo: TodoHandle,
    root: NodeId,
    checkbox: NodeId,
    delete_button: NodeId,
    presence: Cell<Presence>,
}

/// Handle to one rendered todo.
///
/// Gesture listeners hold only weak references, so the view stops reacting
/// once every handle is dropped.
#[derive(Clone)]
pub struct ItemView {
    inner: Rc<ItemViewInner>,
}

impl ItemView {
    /// Builds the node tree for `todo` and wires its gestures.
    ///
    /// Runs the toggle-visual routine once so the completed class matches the
    /// todo. The node is detached at this point, so that `toggle` event
    /// reaches only listeners on the item itself.
    pub fn new(document: &Document, todo: TodoHandle) -> UiResult<Self> {
        let (id, title, completed) = {
            let todo = todo.borrow();
            (todo.id(), todo.title().to_string(), todo.is_completed())
        };

        let (root, checkbox, delete_button) = {
            let mut tree = document.tree_mut();
            let dom_id = format!("todo-{id}");
            let root = tree.create_element(
                "li",
                &[("class", Some("todo list-group-item d-flex align-items-center"))],
            );
            let checkbox = tree.create_element(
                "input",
                &[
                    ("type", Some("checkbox")),
                    ("class", Some("form-check-input")),
                    ("id", Some(dom_id.as_str())),
                    ("checked", completed.then_some("")),
                ],
            );
            let label = tree.create_element(
                "label",
                &[("class", Some("ms-2 form-check-label")), ("for", Some(dom_id.as_str()))],
            );
            tree.set_text(label, &title)?;
            let delete_button =
                tree.create_element("button", &[("class", Some("ms-auto btn btn-danger btn-sm"))]);
            let icon = tree.create_element("i", &[("class", Some("bi-trash"))]);
            tree.append(delete_button, icon)?;
            tree.append(root, checkbox)?;
            tree.append(root, label)?;
            tree.append(root, delete_button)?;
            (root, checkbox, delete_button)
        };

        let view = Self {
            inner: Rc::new(ItemViewInner {
                document: document.clone(),
                todo,
                root,
                checkbox,
                delete_button,
                presence: Cell::new(Presence::Present),
            }),
        };
        view.toggle_visual(completed)?;
        view.wire_gestures();
        Ok(view)
    }

    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    pub fn checkbox(&self) -> NodeId {
        self.inner.checkbox
    }

    pub fn delete_button(&self) -> NodeId {
        self.inner.delete_button
    }

    pub fn todo(&self) -> &TodoHandle {
        &self.inner.todo
    }

    pub fn todo_id(&self) -> TodoId {
        self.inner.todo.borrow().id()
    }

    pub fn presence(&self) -> Presence {
        self.inner.presence.get()
    }

    /// Whether the root currently carries the completed class.
    pub fn renders_completed(&self) -> bool {
        self.inner
            .document
            .tree()
            .has_class(self.inner.root, COMPLETED_CLASS)
    }

    /// Inserts the root as the first child of `container`.
    pub fn prepend_to(&self, container: NodeId) -> UiResult<()> {
        self.inner.document.tree_mut().prepend(container, self.inner.root)
    }

    /// Inserts the root as the last child of `container`.
    pub fn append_to(&self, container: NodeId) -> UiResult<()> {
        self.inner.document.tree_mut().append(container, self.inner.root)
    }

    /// Syncs the completed class with `is_checked` and emits `toggle`.
    ///
    /// The event is emitted even when the class did not change. No-op once removed.
    pub fn toggle_visual(&self, is_checked: bool) -> UiResult<()> {
        if self.presence() == Presence::Removed {
            debug!(
                "event=item_toggle module=view status=skip reason=removed todo_id={}",
                self.todo_id()
            );
            return Ok(());
        }

        self.inner
            .document
            .tree_mut()
            .set_class(self.inner.root, COMPLETED_CLASS, is_checked)?;
        let event = Event::domain(EventKind::Toggle, Rc::clone(&self.inner.todo), false);
        self.inner.document.dispatch(self.inner.root, event);
        Ok(())
    }

    /// Emits a cancelable `delete` event and detaches the root unless vetoed.
    pub fn request_removal(&self) -> UiResult<RemovalOutcome> {
        if self.presence() == Presence::Removed {
            return Ok(RemovalOutcome::AlreadyRemoved);
        }

        let event = Event::domain(EventKind::Delete, Rc::clone(&self.inner.todo), true);
        let event = self.inner.document.dispatch(self.inner.root, event);
        if event.default_prevented() {
            info!(
                "event=todo_delete_vetoed module=view status=skip todo_id={}",
                self.todo_id()
            );
            return Ok(RemovalOutcome::Vetoed);
        }

        self.inner.document.tree_mut().detach(self.inner.root)?;
        self.inner.presence.set(Presence::Removed);
        self.inner.document.remove_listeners(self.inner.root);
        self.inner.document.remove_listeners(self.inner.checkbox);
        self.inner.document.remove_listeners(self.inner.delete_button);
        Ok(RemovalOutcome::Removed)
    }

    fn wire_gestures(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner
            .document
            .add_listener(self.inner.delete_button, EventKind::Click, move |gesture| {
                gesture.prevent_default();
                if let Some(view) = upgrade(&weak) {
                    if let Err(err) = view.request_removal() {
                        error!(
                            "event=item_remove module=view status=error todo_id={} error={err}",
                            view.todo_id()
                        );
                    }
                }
            });

        let weak = Rc::downgrade(&self.inner);
        self.inner
            .document
            .add_listener(self.inner.checkbox, EventKind::Change, move |gesture| {
                let Some(view) = upgrade(&weak) else {
                    return;
                };
                let Some(target) = gesture.target() else {
                    return;
                };
                let checked = view.inner.document.tree().is_checked(target);
                if let Err(err) = view.toggle_visual(checked) {
                    error!(
                        "event=item_toggle module=view status=error todo_id={} error={err}",
                        view.todo_id()
                    );
                }
            });
    }
}

fn upgrade(weak: &Weak<ItemViewInner>) -> Option<ItemView> {
    weak.upgrade().map(|inner| ItemView { inner })
}
