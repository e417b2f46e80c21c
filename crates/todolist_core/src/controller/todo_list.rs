//! Todo list controller.
//!
//! # Responsibility
//! - Own the ordered todo collection, the active filter and persistence timing.
//! - Mount the layout, create/destroy item views, react to bubbled
//!   `delete`/`toggle` events and to form/filter gestures.
//!
//! # Invariants
//! - Only this controller mutates todos and writes the store.
//! - Todo ids held at one time are pairwise distinct.
//! - The stored sequence is insertion order; the rendered list is its reverse.
//! - Every successful add/delete/toggle is followed by exactly one save.
//! - A cancelled `delete` changes neither the collection nor the store.

use crate::id_gen::IdGenerator;
use crate::model::filter::Filter;
use crate::model::todo::{normalize_title, Todo, TodoHandle, TodoId, TodoValidationError};
use crate::store::{StoreError, StoreResult, TodoStore};
use crate::ui::event::{Document, Event, EventKind};
use crate::ui::template::{TemplateRegistry, TODOLIST_LAYOUT};
use crate::ui::tree::{NodeId, UiError};
use crate::view::item_view::{ItemView, COMPLETED_CLASS};
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};
use std::time::Instant;

const LIST_SELECTOR: &str = ".list-group";
const FORM_SELECTOR: &str = "form";
const FILTER_GROUP_SELECTOR: &str = ".btn-group";
const TITLE_FIELD_SELECTOR: &str = "input[name=title]";

/// List class hiding completed items.
pub const HIDE_COMPLETED_CLASS: &str = "hide-completed";
/// List class hiding incomplete items.
pub const HIDE_ACTIVE_CLASS: &str = "hide-todo";
/// Class marking the selected filter button.
pub const ACTIVE_FILTER_CLASS: &str = "active";

/// Controller errors.
#[derive(Debug)]
pub enum TodoListError {
    /// The mounted layout lacks a node the controller relies on.
    MissingLayoutNode(&'static str),
    AlreadyMounted,
    NotMounted,
    Validation(TodoValidationError),
    Ui(UiError),
    Store(StoreError),
}

impl Display for TodoListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLayoutNode(selector) => {
                write!(f, "layout is missing required node `{selector}`")
            }
            Self::AlreadyMounted => write!(f, "todo list is already mounted"),
            Self::NotMounted => write!(f, "todo list is not mounted"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Ui(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Ui(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::MissingLayoutNode(_) | Self::AlreadyMounted | Self::NotMounted => None,
        }
    }
}

impl From<UiError> for TodoListError {
    fn from(value: UiError) -> Self {
        Self::Ui(value)
    }
}

impl From<StoreError> for TodoListError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TodoValidationError> for TodoListError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

#[derive(Clone)]
struct MountedLayout {
    document: Document,
    form: NodeId,
    list: NodeId,
    filter_group: NodeId,
    views: Vec<ItemView>,
}

struct TodoListState {
    todos: Vec<TodoHandle>,
    store: Rc<dyn TodoStore>,
    ids: Box<dyn IdGenerator>,
    filter: Filter,
    layout: Option<MountedLayout>,
    last_persist_error: Option<StoreError>,
}

/// Handle to the todo list controller. Clones share one controller.
#[derive(Clone)]
pub struct TodoList {
    state: Rc<RefCell<TodoListState>>,
}

impl TodoList {
    /// Creates an unmounted controller over `initial`, kept in the given order.
    pub fn new(initial: Vec<Todo>, store: Rc<dyn TodoStore>, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            state: Rc::new(RefCell::new(TodoListState {
                todos: initial.into_iter().map(Todo::into_handle).collect(),
                store,
                ids,
                filter: Filter::All,
                layout: None,
                last_persist_error: None,
            })),
        }
    }

    /// Creates an unmounted controller over the collection saved in `store`.
    pub fn load_from(store: Rc<dyn TodoStore>, ids: Box<dyn IdGenerator>) -> Result<Self, TodoListError> {
        let initial = store.load()?;
        Ok(Self::new(initial, store, ids))
    }

    /// Instantiates the layout into `host`, renders the initial todos and wires listeners.
    ///
    /// Each initial todo is prepended, so the rendered order is the reverse of
    /// the collection order.
    ///
    /// # Errors
    /// - `MissingLayoutNode` when the template lacks the list, form or filter group.
    ///   `host` is left untouched.
    /// - `AlreadyMounted` on a second call.
    pub fn mount(
        &self,
        document: &Document,
        host: NodeId,
        templates: &TemplateRegistry,
    ) -> Result<(), TodoListError> {
        if self.state.borrow().layout.is_some() {
            return Err(TodoListError::AlreadyMounted);
        }
        let started_at = Instant::now();

        let (form, list, filter_group, buttons) = {
            let mut tree = document.tree_mut();
            let layout = templates.clone_template(&mut tree, TODOLIST_LAYOUT)?;
            let find = |selector: &'static str| -> Result<NodeId, TodoListError> {
                tree.query_selector(layout, selector)?
                    .ok_or(TodoListError::MissingLayoutNode(selector))
            };
            let list = find(LIST_SELECTOR)?;
            let form = find(FORM_SELECTOR)?;
            let filter_group = find(FILTER_GROUP_SELECTOR)?;
            let buttons = tree.query_selector_all(filter_group, "button")?;
            tree.append(host, layout)?;
            (form, list, filter_group, buttons)
        };

        let initial = self.state.borrow().todos.clone();
        let mut views = Vec::with_capacity(initial.len());
        for todo in initial {
            let view = ItemView::new(document, todo)?;
            view.prepend_to(list)?;
            views.push(view);
        }
        let count = views.len();

        self.state.borrow_mut().layout = Some(MountedLayout {
            document: document.clone(),
            form,
            list,
            filter_group,
            views,
        });
        self.wire_listeners(document, form, list, &buttons);

        info!(
            "event=todo_list_mount module=controller status=ok count={count} filter_buttons={} duration_ms={}",
            buttons.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Handles a form submission.
    ///
    /// Suppresses the default action, then adds a todo from the trimmed
    /// `title` field. A blank title is a silent no-op and leaves the form as is.
    /// Returns the new todo id.
    pub fn handle_submit(&self, event: &mut Event) -> Option<TodoId> {
        event.prevent_default();
        let layout = self.layout()?;
        let form = event.current_target().unwrap_or(layout.form);

        let raw_title = {
            let tree = layout.document.tree();
            tree.query_selector(form, TITLE_FIELD_SELECTOR)
                .ok()
                .flatten()
                .and_then(|input| tree.value(input).map(str::to_string))
                .unwrap_or_default()
        };

        match self.add_todo(&raw_title) {
            Ok(Some(id)) => {
                reset_form(&layout.document, form);
                Some(id)
            }
            Ok(None) => None,
            Err(err) => {
                error!("event=todo_add module=controller status=error error={err}");
                None
            }
        }
    }

    /// Removes `todo` (matched by identity) and persists.
    ///
    /// Returns `false` when the todo is not held, in which case nothing is saved.
    pub fn handle_delete(&self, todo: &TodoHandle) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.todos.len();
            state.todos.retain(|held| !Rc::ptr_eq(held, todo));
            if let Some(layout) = state.layout.as_mut() {
                layout.views.retain(|view| !Rc::ptr_eq(view.todo(), todo));
            }
            before != state.todos.len()
        };

        let todo_id = todo.borrow().id();
        if !removed {
            debug!("event=todo_delete module=controller status=skip reason=not_held todo_id={todo_id}");
            return false;
        }
        info!("event=todo_delete module=controller status=ok todo_id={todo_id}");
        self.persist_after_mutation();
        true
    }

    /// Flips completion of `todo` in place and persists.
    ///
    /// Returns the new completion state, or `None` when the todo is not held.
    pub fn handle_toggle(&self, todo: &TodoHandle) -> Option<bool> {
        let held = self
            .state
            .borrow()
            .todos
            .iter()
            .any(|candidate| Rc::ptr_eq(candidate, todo));
        if !held {
            debug!(
                "event=todo_toggle module=controller status=skip reason=not_held todo_id={}",
                todo.borrow().id()
            );
            return None;
        }

        let (todo_id, completed) = {
            let mut todo = todo.borrow_mut();
            let completed = todo.toggle_completed();
            (todo.id(), completed)
        };
        info!("event=todo_toggle module=controller status=ok todo_id={todo_id} completed={completed}");
        self.persist_after_mutation();
        Some(completed)
    }

    /// Selects `filter`, styling its button as the only active one.
    ///
    /// Applying the same filter again yields the same state.
    pub fn set_filter(&self, filter: Filter) -> Result<(), TodoListError> {
        let layout = self.layout().ok_or(TodoListError::NotMounted)?;
        let button = layout
            .document
            .tree()
            .query_selector(layout.filter_group, &format!("button[data-filter={}]", filter.data_attr()))?;
        self.apply_filter(&layout, filter, button)
    }

    /// Current filter.
    pub fn filter(&self) -> Filter {
        self.state.borrow().filter
    }

    /// Writes the full collection to the store, overwriting the previous value.
    pub fn persist(&self) -> StoreResult<()> {
        let (store, snapshot) = {
            let state = self.state.borrow();
            let snapshot = state
                .todos
                .iter()
                .map(|todo| todo.borrow().clone())
                .collect::<Vec<_>>();
            (Rc::clone(&state.store), snapshot)
        };

        let started_at = Instant::now();
        match store.save(&snapshot) {
            Ok(()) => {
                debug!(
                    "event=todo_persist module=controller status=ok count={} duration_ms={}",
                    snapshot.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=todo_persist module=controller status=error count={} duration_ms={} error={err}",
                    snapshot.len(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Returns and clears the last persistence failure raised inside an event handler.
    pub fn take_persist_error(&self) -> Option<StoreError> {
        self.state.borrow_mut().last_persist_error.take()
    }

    /// Snapshot of the collection in stored (insertion) order.
    pub fn todos(&self) -> Vec<Todo> {
        self.state
            .borrow()
            .todos
            .iter()
            .map(|todo| todo.borrow().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().todos.is_empty()
    }

    pub fn is_mounted(&self) -> bool {
        self.state.borrow().layout.is_some()
    }

    pub fn document(&self) -> Option<Document> {
        self.layout().map(|layout| layout.document)
    }

    pub fn list_node(&self) -> Option<NodeId> {
        self.layout().map(|layout| layout.list)
    }

    pub fn form_node(&self) -> Option<NodeId> {
        self.layout().map(|layout| layout.form)
    }

    /// The form's title input.
    pub fn title_input(&self) -> Option<NodeId> {
        let layout = self.layout()?;
        let tree = layout.document.tree();
        tree.query_selector(layout.form, TITLE_FIELD_SELECTOR).ok().flatten()
    }

    /// The filter button selecting `filter`.
    pub fn filter_button(&self, filter: Filter) -> Option<NodeId> {
        let layout = self.layout()?;
        let tree = layout.document.tree();
        tree.query_selector(
            layout.filter_group,
            &format!("button[data-filter={}]", filter.data_attr()),
        )
        .ok()
        .flatten()
    }

    /// View rendering the held todo `id`.
    pub fn item_view(&self, id: TodoId) -> Option<ItemView> {
        self.layout()?
            .views
            .into_iter()
            .find(|view| view.todo_id() == id)
    }

    /// Root node of the view rendering the held todo `id`.
    pub fn item_node(&self, id: TodoId) -> Option<NodeId> {
        self.item_view(id).map(|view| view.root())
    }

    /// Ids in rendered (top to bottom) order.
    pub fn rendered_ids(&self) -> Vec<TodoId> {
        self.rendered_views()
            .iter()
            .map(ItemView::todo_id)
            .collect()
    }

    /// Todos whose rendered node is visible under the list's hide classes,
    /// in rendered order.
    pub fn visible_todos(&self) -> Vec<Todo> {
        let Some(layout) = self.layout() else {
            return Vec::new();
        };
        let views = self.rendered_views();
        let tree = layout.document.tree();
        let hide_completed = tree.has_class(layout.list, HIDE_COMPLETED_CLASS);
        let hide_active = tree.has_class(layout.list, HIDE_ACTIVE_CLASS);

        views
            .iter()
            .filter(|view| {
                let completed = tree.has_class(view.root(), COMPLETED_CLASS);
                !((hide_completed && completed) || (hide_active && !completed))
            })
            .map(|view| view.todo().borrow().clone())
            .collect()
    }

    fn rendered_views(&self) -> Vec<ItemView> {
        let Some(layout) = self.layout() else {
            return Vec::new();
        };
        let children = layout.document.tree().children(layout.list).to_vec();
        children
            .into_iter()
            .filter_map(|node| layout.views.iter().find(|view| view.root() == node).cloned())
            .collect()
    }

    fn add_todo(&self, raw_title: &str) -> Result<Option<TodoId>, TodoListError> {
        let Some(title) = normalize_title(raw_title) else {
            debug!("event=todo_add module=controller status=skip reason=empty_title");
            return Ok(None);
        };
        let layout = self.layout().ok_or(TodoListError::NotMounted)?;

        let id = self.fresh_id();
        let todo = Todo::new(id, title)?.into_handle();
        let view = ItemView::new(&layout.document, Rc::clone(&todo))?;
        view.prepend_to(layout.list)?;

        {
            let mut state = self.state.borrow_mut();
            state.todos.push(todo);
            if let Some(layout) = state.layout.as_mut() {
                layout.views.push(view);
            }
        }
        info!("event=todo_add module=controller status=ok todo_id={id}");
        self.persist_after_mutation();
        Ok(Some(id))
    }

    /// Draws ids until one is not held yet.
    fn fresh_id(&self) -> TodoId {
        let mut state = self.state.borrow_mut();
        loop {
            let id = state.ids.next_id();
            if state.todos.iter().all(|todo| todo.borrow().id() != id) {
                return id;
            }
            warn!("event=todo_id module=controller status=retry reason=collision todo_id={id}");
        }
    }

    fn apply_filter(
        &self,
        layout: &MountedLayout,
        filter: Filter,
        button: Option<NodeId>,
    ) -> Result<(), TodoListError> {
        {
            let mut tree = layout.document.tree_mut();
            if let Some(button) = button {
                let selector = format!(".{ACTIVE_FILTER_CLASS}");
                for active in tree.query_selector_all(layout.filter_group, &selector)? {
                    tree.remove_class(active, ACTIVE_FILTER_CLASS)?;
                }
                tree.add_class(button, ACTIVE_FILTER_CLASS)?;
            }
            tree.set_class(layout.list, HIDE_COMPLETED_CLASS, filter.hides_completed())?;
            tree.set_class(layout.list, HIDE_ACTIVE_CLASS, filter.hides_active())?;
        }

        self.state.borrow_mut().filter = filter;
        info!("event=todo_filter module=controller status=ok filter={filter}");
        Ok(())
    }

    fn persist_after_mutation(&self) {
        if let Err(err) = self.persist() {
            self.state.borrow_mut().last_persist_error = Some(err);
        }
    }

    fn layout(&self) -> Option<MountedLayout> {
        self.state.borrow().layout.clone()
    }

    fn wire_listeners(&self, document: &Document, form: NodeId, list: NodeId, buttons: &[NodeId]) {
        let weak = Rc::downgrade(&self.state);
        document.add_listener(form, EventKind::Submit, move |event| {
            if let Some(list) = upgrade(&weak) {
                list.handle_submit(event);
            }
        });

        for button in buttons {
            let weak = Rc::downgrade(&self.state);
            document.add_listener(*button, EventKind::Click, move |event| {
                event.prevent_default();
                let (Some(list), Some(button)) = (upgrade(&weak), event.current_target()) else {
                    return;
                };
                let Some(layout) = list.layout() else {
                    return;
                };
                let filter = layout
                    .document
                    .tree()
                    .attr(button, "data-filter")
                    .map_or(Filter::All, Filter::from_data_attr);
                if let Err(err) = list.apply_filter(&layout, filter, Some(button)) {
                    error!("event=todo_filter module=controller status=error error={err}");
                }
            });
        }

        let weak = Rc::downgrade(&self.state);
        document.add_listener(list, EventKind::Delete, move |event| {
            let Some(todo) = event.detail().cloned() else {
                return;
            };
            let weak = weak.clone();
            event.on_default(move |_| {
                if let Some(list) = upgrade(&weak) {
                    list.handle_delete(&todo);
                }
            });
        });

        let weak = Rc::downgrade(&self.state);
        document.add_listener(list, EventKind::Toggle, move |event| {
            if let (Some(list), Some(todo)) = (upgrade(&weak), event.detail()) {
                list.handle_toggle(todo);
            }
        });
    }
}

fn upgrade(weak: &Weak<RefCell<TodoListState>>) -> Option<TodoList> {
    weak.upgrade().map(|state| TodoList { state })
}

/// Restores every input of `form` to its initial `value` attribute.
fn reset_form(document: &Document, form: NodeId) {
    let mut tree = document.tree_mut();
    let inputs = tree.query_selector_all(form, "input").unwrap_or_default();
    for input in inputs {
        let initial = tree.attr(input, "value").unwrap_or_default().to_string();
        if let Err(err) = tree.set_value(input, &initial) {
            warn!("event=form_reset module=controller status=error node={input} error={err}");
        }
    }
}
