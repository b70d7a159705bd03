//! Connector entity.
//!
//! A connector links host endpoints into the propagation graph. It may read
//! from a source endpoint, write into a destination endpoint, and fan its
//! value out to peer connectors along directed edges (`self -> peer`).
//!
//! `Connector` is a cheap, clonable handle. Clones refer to the same
//! connector and compare equal.

mod handle;
mod role;

pub use handle::{ConnectorHandle, DEFAULT_HANDLE_RADIUS};
pub use role::ConnectorRole;

use crate::endpoint::{EndpointRef, Value, endpoint_name};
use crate::error::{WiringError, WiringResult};
use crate::events::{
    ConnectorEvent, ConnectorEventKind, EndpointEvent, Listener, ListenerId, Listeners,
};
use crate::gesture::GestureCoordinator;
use crate::graph;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Unique identifier for a connector.
pub type ConnectorId = Uuid;

/// A bound source endpoint plus the subscriptions the connector holds on it.
struct SourceBinding {
    endpoint: EndpointRef,
    input: ListenerId,
    change: ListenerId,
}

struct ConnectorInner {
    id: ConnectorId,
    /// Explicitly assigned name.
    name: RefCell<Option<String>>,
    /// Last propagated value, `None` until first set.
    value: RefCell<Option<Value>>,
    /// Outgoing edges in insertion order, no duplicates.
    peers: RefCell<Vec<Connector>>,
    /// UI-visible connected flag.
    connected: Cell<bool>,
    source: RefCell<Option<SourceBinding>>,
    destination: RefCell<Option<EndpointRef>>,
    handle: Cell<ConnectorHandle>,
    listeners: Listeners<ConnectorEvent>,
    /// Listeners of the surface this connector is attached to.
    parent: RefCell<Weak<Listeners<ConnectorEvent>>>,
    coordinator: Rc<GestureCoordinator>,
}

/// A wiring endpoint that links host widgets into the propagation graph.
#[derive(Clone)]
pub struct Connector {
    inner: Rc<ConnectorInner>,
}

impl PartialEq for Connector {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Connector {}

impl Hash for Connector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name.borrow())
            .field("value", &self.inner.value.borrow())
            .field("peers", &self.peer_count())
            .field("connected", &self.inner.connected.get())
            .field("role", &self.role())
            .finish()
    }
}

impl Connector {
    /// Create a detached connector driven by `coordinator` for wiring gestures.
    pub fn new(coordinator: Rc<GestureCoordinator>) -> Self {
        Self {
            inner: Rc::new(ConnectorInner {
                id: Uuid::new_v4(),
                name: RefCell::new(None),
                value: RefCell::new(None),
                peers: RefCell::new(Vec::new()),
                connected: Cell::new(false),
                source: RefCell::new(None),
                destination: RefCell::new(None),
                handle: Cell::new(ConnectorHandle::default()),
                listeners: Listeners::new(),
                parent: RefCell::new(Weak::new()),
                coordinator,
            }),
        }
    }

    pub fn id(&self) -> ConnectorId {
        self.inner.id
    }

    // --- Identity ---

    /// Resolve the connector name.
    ///
    /// Explicit name first, then the source endpoint's name, then the
    /// destination endpoint's name. Empty names count as absent.
    pub fn name(&self) -> WiringResult<String> {
        if let Some(name) = self.explicit_name() {
            return Ok(name);
        }
        let from_source = self.source_endpoint().as_ref().and_then(endpoint_name);
        from_source
            .or_else(|| self.destination_endpoint().as_ref().and_then(endpoint_name))
            .ok_or(WiringError::NameUnresolved)
    }

    /// The explicitly assigned name, if any.
    pub fn explicit_name(&self) -> Option<String> {
        self.inner
            .name
            .borrow()
            .clone()
            .filter(|name| !name.is_empty())
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.inner.name.borrow_mut() = Some(name.into());
    }

    /// Role derived from the current endpoint bindings.
    pub fn role(&self) -> ConnectorRole {
        ConnectorRole::from_bindings(self.has_source(), self.has_destination())
    }

    pub fn has_source(&self) -> bool {
        self.inner.source.borrow().is_some()
    }

    pub fn has_destination(&self) -> bool {
        self.inner.destination.borrow().is_some()
    }

    // --- Value ---

    /// Last propagated value.
    pub fn value(&self) -> Option<Value> {
        self.inner.value.borrow().clone()
    }

    /// Set the value and propagate it synchronously.
    ///
    /// Setting the current value again is a no-op. Otherwise every peer
    /// receives the value depth-first in insertion order, then the
    /// destination endpoint (if bound) is written and gets `Input` followed
    /// by `Change`. Everything completes before this call returns.
    pub fn set_value(&self, value: impl Into<Value>) {
        graph::propagate(self, value.into());
    }

    pub(crate) fn holds_value(&self, value: &Value) -> bool {
        self.inner.value.borrow().as_ref() == Some(value)
    }

    pub(crate) fn store_value(&self, value: Value) {
        *self.inner.value.borrow_mut() = Some(value);
    }

    /// Write `value` into the destination endpoint and notify its listeners.
    pub(crate) fn deliver(&self, value: &Value) {
        let Some(destination) = self.destination_endpoint() else {
            return;
        };
        destination.set_value(value.clone());
        destination.dispatch(EndpointEvent::Input);
        destination.dispatch(EndpointEvent::Change);
    }

    // --- Edges ---

    /// Connectors this one fans out to, in insertion order.
    pub fn peers(&self) -> Vec<Connector> {
        self.inner.peers.borrow().clone()
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.borrow().len()
    }

    pub fn is_connected_to(&self, peer: &Connector) -> bool {
        self.inner.peers.borrow().contains(peer)
    }

    /// UI-visible connected flag.
    pub fn connected(&self) -> bool {
        self.inner.connected.get()
    }

    /// Update the connected flag. A bound destination endpoint is disabled
    /// while the flag is set.
    pub(crate) fn set_connected(&self, connected: bool) {
        self.inner.connected.set(connected);
        if let Some(destination) = self.destination_endpoint() {
            destination.set_disabled(connected);
        }
    }

    /// Add the edge `self -> peer`.
    ///
    /// Pushes the current value (if any) into `peer` and emits `Connected`
    /// on both connectors.
    pub fn connect(&self, peer: &Connector) {
        {
            let mut peers = self.inner.peers.borrow_mut();
            if !peers.contains(peer) {
                peers.push(peer.clone());
            }
        }
        peer.set_connected(true);
        self.set_connected(true);

        if let Some(value) = self.value() {
            peer.set_value(value);
        }

        log::info!("Connected {} -> {}", self.label(), peer.label());

        let kind = ConnectorEventKind::Connected {
            source: self.id(),
            destination: peer.id(),
        };
        self.emit(kind.clone());
        peer.emit(kind);
    }

    /// Remove the edge `self -> peer`, or every outgoing edge when `peer` is
    /// `None`.
    ///
    /// Each former peer has its connected flag cleared unless it still has
    /// peers of its own, and receives `Disconnected`. `Disconnected` is
    /// always emitted on `self` as well, even when nothing was removed.
    pub fn disconnect(&self, peer: Option<&Connector>) {
        let removed: Vec<Connector> = match peer {
            Some(peer) => {
                self.inner.peers.borrow_mut().retain(|p| p != peer);
                vec![peer.clone()]
            }
            None => self.inner.peers.borrow_mut().drain(..).collect(),
        };

        for former in &removed {
            former.set_connected(former.peer_count() > 0);
            log::info!("Disconnected {} -> {}", self.label(), former.label());
            former.emit(ConnectorEventKind::Disconnected {
                source: self.id(),
                destination: Some(former.id()),
            });
        }

        self.set_connected(self.peer_count() > 0);
        self.emit(ConnectorEventKind::Disconnected {
            source: self.id(),
            destination: peer.map(Connector::id),
        });
    }

    // --- Endpoints ---

    pub fn source_endpoint(&self) -> Option<EndpointRef> {
        self.inner
            .source
            .borrow()
            .as_ref()
            .map(|binding| binding.endpoint.clone())
    }

    /// Bind (or unbind) the source endpoint.
    ///
    /// Subscriptions on the previous endpoint are removed. The new endpoint's
    /// `Input` and `Change` notifications copy its value into this connector.
    /// If a destination is already bound, the endpoint's current value is
    /// pulled immediately.
    pub fn set_source_endpoint(&self, endpoint: Option<EndpointRef>) {
        let previous = self.inner.source.borrow_mut().take();
        if let Some(previous) = previous {
            previous.endpoint.unsubscribe(previous.input);
            previous.endpoint.unsubscribe(previous.change);
        }

        let Some(endpoint) = endpoint else {
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        let listener: Listener<EndpointEvent> = Rc::new(move |_: &EndpointEvent| {
            if let Some(inner) = weak.upgrade() {
                Connector { inner }.pull_source();
            }
        });
        let input = endpoint.subscribe(EndpointEvent::Input, listener.clone());
        let change = endpoint.subscribe(EndpointEvent::Change, listener);
        *self.inner.source.borrow_mut() = Some(SourceBinding {
            endpoint,
            input,
            change,
        });

        if self.has_destination() {
            self.pull_source();
        }
    }

    pub fn destination_endpoint(&self) -> Option<EndpointRef> {
        self.inner.destination.borrow().clone()
    }

    /// Bind (or unbind) the destination endpoint. A defined value is pushed
    /// into the new endpoint right away, without notifications.
    pub fn set_destination_endpoint(&self, endpoint: Option<EndpointRef>) {
        *self.inner.destination.borrow_mut() = endpoint.clone();
        if let (Some(endpoint), Some(value)) = (endpoint, self.value()) {
            endpoint.set_value(value);
        }
    }

    fn pull_source(&self) {
        if let Some(source) = self.source_endpoint() {
            self.set_value(source.value());
        }
    }

    // --- Geometry ---

    pub fn handle(&self) -> ConnectorHandle {
        self.inner.handle.get()
    }

    pub fn set_handle(&self, handle: ConnectorHandle) {
        self.inner.handle.set(handle);
    }

    // --- Notifications ---

    /// Listen to notifications dispatched on this connector.
    pub fn subscribe(&self, listener: impl Fn(&ConnectorEvent) + 'static) -> ListenerId {
        self.inner.listeners.add(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Dispatch on this connector, then bubble to the attached surface.
    pub(crate) fn emit(&self, kind: ConnectorEventKind) {
        let event = ConnectorEvent {
            target: self.id(),
            kind,
        };
        log::debug!("{} on {}", event.kind.name(), self.label());
        self.inner.listeners.emit(&event);
        let parent = self.inner.parent.borrow().upgrade();
        if let Some(parent) = parent {
            parent.emit(&event);
        }
    }

    // --- Gesture ---

    /// Pointer pressed on this connector's handle. Returns true if this
    /// armed a wiring gesture.
    pub fn pointer_down(&self) -> bool {
        self.inner.coordinator.press(self)
    }

    // --- Lifecycle ---

    pub(crate) fn attach_to(&self, parent: &Rc<Listeners<ConnectorEvent>>) {
        *self.inner.parent.borrow_mut() = Rc::downgrade(parent);
    }

    /// Drop outgoing edges, endpoint subscriptions and any armed gesture,
    /// then stop bubbling to the surface.
    pub(crate) fn teardown(&self) {
        if self.inner.coordinator.is_active(self) {
            self.inner.coordinator.cancel();
        }
        if self.peer_count() > 0 {
            self.disconnect(None);
        } else {
            self.set_connected(false);
        }
        self.set_source_endpoint(None);
        *self.inner.parent.borrow_mut() = Weak::new();
    }

    /// Drop edges and the source subscription without notifications.
    pub(crate) fn release(&self) {
        self.inner.peers.borrow_mut().clear();
        self.set_source_endpoint(None);
        *self.inner.parent.borrow_mut() = Weak::new();
    }

    /// Name for log lines; falls back to the id.
    pub(crate) fn label(&self) -> String {
        self.name().unwrap_or_else(|_| self.id().to_string())
    }
}
