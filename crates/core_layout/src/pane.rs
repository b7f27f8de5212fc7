//! Pane descriptors and the navigation handle handed to pane content.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Unique key of a pane within a [`PaneList`](crate::PaneList).
pub type PaneId = String;

/// Producer of a pane's view.
///
/// The layout engine never looks inside the view; it only hands the
/// [`Navigator`] to factories so content can open or close panes.
pub enum PaneContent<V> {
    /// A ready-made view, cloned on every render.
    Static(V),
    /// A view built on demand from the navigation handle.
    Factory(Rc<dyn Fn(&Navigator<V>) -> V>),
}

impl<V> PaneContent<V> {
    /// Wrap a closure as factory content.
    pub fn factory(f: impl Fn(&Navigator<V>) -> V + 'static) -> Self {
        Self::Factory(Rc::new(f))
    }
}

impl<V: Clone> PaneContent<V> {
    /// Produce the view for this content.
    pub fn view(&self, navigator: &Navigator<V>) -> V {
        match self {
            Self::Static(view) => view.clone(),
            Self::Factory(f) => f(navigator),
        }
    }
}

impl<V: Clone> Clone for PaneContent<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(view) => Self::Static(view.clone()),
            Self::Factory(f) => Self::Factory(Rc::clone(f)),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for PaneContent<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(view) => f.debug_tuple("Static").field(view).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// A logical pane: identity, tab title and content.
pub struct PaneDescriptor<V> {
    /// Unique key.
    pub id: PaneId,
    /// Title shown on the collapsed tab.
    pub title: String,
    /// Content producer.
    pub content: PaneContent<V>,
}

impl<V> PaneDescriptor<V> {
    /// Create a pane with static content.
    pub fn new(id: impl Into<PaneId>, title: impl Into<String>, view: V) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: PaneContent::Static(view),
        }
    }

    /// Create a pane whose view is built from the navigation handle.
    pub fn with_factory(
        id: impl Into<PaneId>,
        title: impl Into<String>,
        f: impl Fn(&Navigator<V>) -> V + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: PaneContent::factory(f),
        }
    }
}

impl<V: Clone> Clone for PaneDescriptor<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for PaneDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneDescriptor")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("content", &self.content)
            .finish()
    }
}

/// A navigation request queued through a [`Navigator`].
pub enum NavRequest<V> {
    /// Open (append or promote) a pane.
    Open(PaneDescriptor<V>),
    /// Close the pane with this id.
    Close(PaneId),
}

impl<V> fmt::Debug for NavRequest<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(pane) => f.debug_tuple("Open").field(&pane.id).finish(),
            Self::Close(id) => f.debug_tuple("Close").field(id).finish(),
        }
    }
}

/// Handle for navigating a container from pane content or from outside.
///
/// Requests are queued in arrival order and applied by the owning
/// [`Container`](crate::Container) on its next tick, so content can
/// navigate while it is being rendered.
pub struct Navigator<V> {
    queue: Rc<RefCell<VecDeque<NavRequest<V>>>>,
}

impl<V> Navigator<V> {
    /// Create a handle with an empty queue.
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Request that `pane` be opened.
    pub fn open_pane(&self, pane: PaneDescriptor<V>) {
        self.queue.borrow_mut().push_back(NavRequest::Open(pane));
    }

    /// Request that the pane with `id` be closed.
    pub fn close_pane(&self, id: impl Into<PaneId>) {
        self.queue.borrow_mut().push_back(NavRequest::Close(id.into()));
    }

    /// Number of queued requests.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Take all queued requests, oldest first.
    pub(crate) fn drain(&self) -> Vec<NavRequest<V>> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

impl<V> Default for Navigator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Navigator<V> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
        }
    }
}

impl<V> fmt::Debug for Navigator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("pending", &self.pending())
            .finish()
    }
}
