//! Bubbling event dispatch over a shared document.
//!
//! # Responsibility
//! - Register listeners per `(node, kind)`.
//! - Dispatch events from a target up through its ancestors.
//! - Provide gesture helpers that emulate host input (click, checkbox change, submit).
//!
//! # Invariants
//! - Listeners on one node run in registration order; nodes run target-first.
//! - The bubble path is fixed when dispatch starts.
//! - `prevent_default` is ignored for non-cancelable events.
//! - Default actions queued by listeners run after propagation ends, in queue
//!   order, and only when the event was not cancelled.
//! - No tree or listener-table borrow is held while a listener runs.

use crate::model::todo::TodoHandle;
use crate::ui::tree::{NodeId, UiTree};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Event names understood by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer activation of a node.
    Click,
    /// Form control state changed (checkbox toggled).
    Change,
    /// Form submission.
    Submit,
    /// Domain event: an item asks to be removed. Cancelable.
    Delete,
    /// Domain event: an item's completion changed. Not cancelable.
    Toggle,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Change => "change",
            Self::Submit => "submit",
            Self::Delete => "delete",
            Self::Toggle => "toggle",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-flight event.
#[derive(Clone)]
pub struct Event {
    kind: EventKind,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    bubbles: bool,
    cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    detail: Option<TodoHandle>,
    default_actions: Vec<DefaultAction>,
}

type DefaultAction = Rc<dyn Fn(&Event)>;

impl Event {
    /// Creates a non-bubbling, non-cancelable event.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            current_target: None,
            bubbles: false,
            cancelable: false,
            default_prevented: false,
            propagation_stopped: false,
            detail: None,
            default_actions: Vec::new(),
        }
    }

    /// Creates a domain event carrying `todo`, bubbling toward the list owner.
    pub fn domain(kind: EventKind, todo: TodoHandle, cancelable: bool) -> Self {
        Self::new(kind)
            .bubbling(true)
            .cancelable(cancelable)
            .with_detail(todo)
    }

    pub fn bubbling(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn with_detail(mut self, todo: TodoHandle) -> Self {
        self.detail = Some(todo);
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Node the event was dispatched on. `None` before dispatch.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Node whose listeners are currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn detail(&self) -> Option<&TodoHandle> {
        self.detail.as_ref()
    }

    /// Marks the default action as suppressed. No effect on non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Queues `action` to run once propagation ends, unless the event is cancelled.
    ///
    /// Listeners use this to commit state changes that a later listener on the
    /// bubble path must still be able to veto.
    pub fn on_default(&mut self, action: impl Fn(&Event) + 'static) {
        self.default_actions.push(Rc::new(action));
    }

    /// Stops bubbling after the listeners of the current node finish.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("current_target", &self.current_target)
            .field("cancelable", &self.cancelable)
            .field("default_prevented", &self.default_prevented)
            .field("todo_id", &self.detail.as_ref().map(|todo| todo.borrow().id()))
            .finish()
    }
}

type Listener = Rc<dyn Fn(&mut Event)>;

#[derive(Default)]
struct DocumentInner {
    tree: RefCell<UiTree>,
    listeners: RefCell<HashMap<(NodeId, EventKind), Vec<Listener>>>,
}

/// Shared single-threaded handle to a UI tree and its listeners.
///
/// Cloning yields another handle to the same document.
#[derive(Clone, Default)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the tree for reading. Do not hold across `dispatch`.
    pub fn tree(&self) -> Ref<'_, UiTree> {
        self.inner.tree.borrow()
    }

    /// Borrows the tree for writing. Do not hold across `dispatch`.
    pub fn tree_mut(&self) -> RefMut<'_, UiTree> {
        self.inner.tree.borrow_mut()
    }

    /// Registers `listener` for `kind` events reaching `node`.
    pub fn add_listener(&self, node: NodeId, kind: EventKind, listener: impl Fn(&mut Event) + 'static) {
        self.inner
            .listeners
            .borrow_mut()
            .entry((node, kind))
            .or_default()
            .push(Rc::new(listener));
    }

    /// Drops every listener registered on `node`.
    pub fn remove_listeners(&self, node: NodeId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(owner, _), _| *owner != node);
    }

    /// Dispatches `event` on `target` and returns it after all listeners ran.
    pub fn dispatch(&self, target: NodeId, mut event: Event) -> Event {
        event.target = Some(target);
        let path = if event.bubbles {
            self.tree().path_to_root(target)
        } else {
            vec![target]
        };

        for node in path {
            let listeners = self.listeners_for(node, event.kind);
            if listeners.is_empty() {
                continue;
            }
            event.current_target = Some(node);
            for listener in listeners {
                listener(&mut event);
            }
            if event.propagation_stopped {
                break;
            }
        }

        event.current_target = None;
        let actions = std::mem::take(&mut event.default_actions);
        if !event.default_prevented {
            for action in actions {
                action(&event);
            }
        }
        event
    }

    /// Emulates a pointer click on `node`.
    pub fn click(&self, node: NodeId) -> Event {
        self.dispatch(node, Event::new(EventKind::Click).bubbling(true).cancelable(true))
    }

    /// Emulates the user flipping a checkbox: updates `checked`, then fires `change`.
    pub fn toggle_checkbox(&self, node: NodeId) -> Event {
        {
            let mut tree = self.tree_mut();
            let checked = tree.is_checked(node);
            if tree.set_checked(node, !checked).is_err() {
                return Event::new(EventKind::Change);
            }
        }
        self.dispatch(node, Event::new(EventKind::Change).bubbling(true))
    }

    /// Emulates submitting `form`.
    pub fn submit(&self, form: NodeId) -> Event {
        self.dispatch(form, Event::new(EventKind::Submit).bubbling(true).cancelable(true))
    }

    fn listeners_for(&self, node: NodeId, kind: EventKind) -> Vec<Listener> {
        self.inner
            .listeners
            .borrow()
            .get(&(node, kind))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, Event, EventKind};
    use crate::model::todo::Todo;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn nested(document: &Document) -> (super::NodeId, super::NodeId, super::NodeId) {
        let mut tree = document.tree_mut();
        let outer = tree.create_element("ul", &[]);
        let middle = tree.create_element("li", &[]);
        let inner = tree.create_element("button", &[]);
        tree.append(outer, middle).expect("append middle");
        tree.append(middle, inner).expect("append inner");
        (outer, middle, inner)
    }

    #[test]
    fn bubbling_visits_target_then_ancestors() {
        let document = Document::new();
        let (outer, middle, inner) = nested(&document);
        let seen = Rc::new(RefCell::new(Vec::new()));
        for node in [outer, middle, inner] {
            let seen = Rc::clone(&seen);
            document.add_listener(node, EventKind::Click, move |event| {
                seen.borrow_mut().push(event.current_target());
            });
        }

        let event = document.click(inner);
        assert_eq!(event.target(), Some(inner));
        assert_eq!(
            *seen.borrow(),
            vec![Some(inner), Some(middle), Some(outer)]
        );
    }

    #[test]
    fn non_bubbling_event_stays_on_target() {
        let document = Document::new();
        let (outer, _, inner) = nested(&document);
        let reached = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&reached);
        document.add_listener(outer, EventKind::Click, move |_| *flag.borrow_mut() = true);

        document.dispatch(inner, Event::new(EventKind::Click));
        assert!(!*reached.borrow());
    }

    #[test]
    fn prevent_default_only_applies_to_cancelable_events() {
        let document = Document::new();
        let (outer, _, inner) = nested(&document);
        document.add_listener(outer, EventKind::Delete, |event| event.prevent_default());
        document.add_listener(outer, EventKind::Toggle, |event| event.prevent_default());
        let todo = Todo::new(1, "a").expect("valid").into_handle();

        let delete = document.dispatch(inner, Event::domain(EventKind::Delete, todo.clone(), true));
        let toggle = document.dispatch(inner, Event::domain(EventKind::Toggle, todo, false));
        assert!(delete.default_prevented());
        assert!(!toggle.default_prevented());
    }

    #[test]
    fn default_actions_run_after_bubbling_unless_cancelled() {
        let document = Document::new();
        let (outer, middle, inner) = nested(&document);
        let log = Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&log);
        document.add_listener(middle, EventKind::Delete, move |event| {
            let log = Rc::clone(&queue);
            event.on_default(move |_| log.borrow_mut().push("committed"));
        });
        let seen = Rc::clone(&log);
        document.add_listener(outer, EventKind::Delete, move |_| seen.borrow_mut().push("outer"));
        let todo = Todo::new(1, "a").expect("valid").into_handle();

        document.dispatch(inner, Event::domain(EventKind::Delete, todo.clone(), true));
        assert_eq!(*log.borrow(), vec!["outer", "committed"]);

        log.borrow_mut().clear();
        document.add_listener(outer, EventKind::Delete, |event| event.prevent_default());
        let event = document.dispatch(inner, Event::domain(EventKind::Delete, todo, true));
        assert!(event.default_prevented());
        assert_eq!(*log.borrow(), vec!["outer"]);
    }

    #[test]
    fn stop_propagation_halts_after_current_node() {
        let document = Document::new();
        let (outer, middle, inner) = nested(&document);
        let reached = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&reached);
        document.add_listener(middle, EventKind::Click, |event| event.stop_propagation());
        document.add_listener(outer, EventKind::Click, move |_| *flag.borrow_mut() = true);

        document.click(inner);
        assert!(!*reached.borrow());
    }

    #[test]
    fn listeners_may_mutate_tree_and_dispatch_again() {
        let document = Document::new();
        let (outer, middle, inner) = nested(&document);
        let handle = document.clone();
        document.add_listener(middle, EventKind::Click, move |_| {
            handle.tree_mut().detach(middle).expect("detach");
            handle.submit(inner);
        });

        document.click(inner);
        assert!(document.tree().children(outer).is_empty());
    }

    #[test]
    fn toggle_checkbox_flips_checked_before_listeners_run() {
        let document = Document::new();
        let checkbox = document
            .tree_mut()
            .create_element("input", &[("type", Some("checkbox"))]);
        let observed = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&observed);
        let handle = document.clone();
        document.add_listener(checkbox, EventKind::Change, move |event| {
            let target = event.target().expect("dispatched");
            *slot.borrow_mut() = Some(handle.tree().is_checked(target));
        });

        document.toggle_checkbox(checkbox);
        assert_eq!(*observed.borrow(), Some(true));
    }
}
