//! Notification plumbing shared by connectors, endpoints and surfaces.
//!
//! Listeners are plain closures stored behind `Rc`. Emitting snapshots the
//! registry first, so a listener may add or remove listeners (or re-enter the
//! emitter) without tripping a `RefCell` borrow.

use crate::connector::ConnectorId;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle returned when registering a listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A registered notification callback.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Ordered registry of listeners for one kind of notification.
pub struct Listeners<E> {
    entries: RefCell<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

impl<E> Listeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Register a closure.
    pub fn add(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        self.add_shared(Rc::new(listener))
    }

    /// Register an already shared closure (the same closure may sit in several registries).
    pub fn add_shared(&self, listener: Listener<E>) -> ListenerId {
        let id = ListenerId::next();
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered here.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Call every listener in registration order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Notifications a host endpoint emits when its value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointEvent {
    /// Value is changing (fires on every edit).
    Input,
    /// Value was committed.
    Change,
}

/// Detail payload of a connector notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectorEventKind {
    /// A wiring gesture was armed on the target connector.
    Connect {
        has_source: bool,
        has_destination: bool,
    },
    /// An edge `source -> destination` was established.
    Connected {
        source: ConnectorId,
        destination: ConnectorId,
    },
    /// An edge was removed, or the connector refreshed its connected state.
    Disconnected {
        source: ConnectorId,
        destination: Option<ConnectorId>,
    },
}

impl ConnectorEventKind {
    /// Event name as seen by the host UI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Connected { .. } => "connected",
            Self::Disconnected { .. } => "disconnected",
        }
    }
}

/// A connector notification. Bubbles from the target connector to the
/// surface it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorEvent {
    /// Connector the notification was dispatched on.
    pub target: ConnectorId,
    #[serde(flatten)]
    pub kind: ConnectorEventKind,
}
