//! Wiring surface: the container connectors are attached to.
//!
//! The surface owns connector handle geometry, routes pointer events into its
//! gesture coordinator, bubbles connector notifications to its own listeners
//! and applies declarative connector specs.

use crate::config::{ConnectorSpec, EndpointResolver, SurfaceConfig};
use crate::connector::{Connector, ConnectorHandle, ConnectorId};
use crate::endpoint::{EndpointRef, endpoint_name};
use crate::error::{WiringError, WiringResult};
use crate::events::{ConnectorEvent, ListenerId, Listeners};
use crate::gesture::{GestureCoordinator, GestureOutcome};
use crate::graph::{self, Edge};
use crate::input::{InputState, PointerEvent};
use kurbo::{Line, Point};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Wire being dragged out of the armed connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingWire {
    pub connector: ConnectorId,
    /// Whether the primary button is still held. A gesture released on its
    /// own connector stays armed with the button up.
    pub dragging: bool,
    /// Handle center of the armed connector.
    pub from: Point,
    /// Current pointer position.
    pub to: Point,
}

impl PendingWire {
    pub fn line(&self) -> Line {
        Line::new(self.from, self.to)
    }
}

/// Resolved bindings for one spec, computed before anything is mutated.
struct PlannedConnector<'a> {
    spec: &'a ConnectorSpec,
    name: Option<String>,
    source: Option<EndpointRef>,
    destination: Option<EndpointRef>,
}

/// Container of connectors in z-order (last attached is topmost).
pub struct WiringSurface {
    config: SurfaceConfig,
    coordinator: Rc<GestureCoordinator>,
    connectors: Vec<Connector>,
    events: Rc<Listeners<ConnectorEvent>>,
    input: InputState,
}

impl Default for WiringSurface {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl std::fmt::Debug for WiringSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiringSurface")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .field("connectors", &self.connectors.len())
            .finish()
    }
}

impl Drop for WiringSurface {
    fn drop(&mut self) {
        self.coordinator.cancel();
        for connector in &self.connectors {
            connector.release();
        }
    }
}

impl WiringSurface {
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            input: InputState::new(config.primary_button),
            config,
            coordinator: Rc::new(GestureCoordinator::new()),
            connectors: Vec::new(),
            events: Rc::new(Listeners::new()),
        }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Rc<GestureCoordinator> {
        &self.coordinator
    }

    // --- Connectors ---

    /// Create a connector with its handle at `position` and attach it on top.
    pub fn create_connector(&mut self, position: Point) -> Connector {
        let connector = Connector::new(self.coordinator.clone());
        let handle = ConnectorHandle::new(position).with_radius(self.config.handle_radius);
        connector.set_handle(handle);
        connector.attach_to(&self.events);
        log::info!("Attached connector {}", connector.id());
        self.connectors.push(connector.clone());
        connector
    }

    /// Detach a connector: inbound edges from other connectors are removed,
    /// then its own edges, endpoint subscriptions and armed gesture.
    pub fn detach(&mut self, id: ConnectorId) -> WiringResult<Connector> {
        let index = self
            .connectors
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| WiringError::UnknownConnector(id.to_string()))?;

        let connector = self.connectors[index].clone();
        for other in &self.connectors {
            if other.is_connected_to(&connector) {
                other.disconnect(Some(&connector));
            }
        }
        connector.teardown();
        self.connectors.remove(index);
        log::info!("Detached connector {}", connector.label());
        Ok(connector)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<Connector> {
        self.connectors.iter().find(|c| c.id() == id).cloned()
    }

    pub fn connector_by_name(&self, name: &str) -> Option<Connector> {
        self.connectors
            .iter()
            .find(|c| c.name().is_ok_and(|n| n == name))
            .cloned()
    }

    /// Attached connectors, bottom to top.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    // --- Notifications ---

    /// Listen to notifications bubbling up from every attached connector.
    pub fn subscribe(&self, listener: impl Fn(&ConnectorEvent) + 'static) -> ListenerId {
        self.events.add(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.events.remove(id)
    }

    // --- Hit testing ---

    /// Connectors whose handle is under `point`, front to back.
    pub fn connectors_at(&self, point: Point) -> Vec<ConnectorId> {
        self.connectors
            .iter()
            .rev()
            .filter(|c| c.handle().hit_test(point, self.config.hit_tolerance))
            .map(Connector::id)
            .collect()
    }

    /// Topmost connector under `point`.
    pub fn connector_at(&self, point: Point) -> Option<Connector> {
        self.connectors
            .iter()
            .rev()
            .find(|c| c.handle().hit_test(point, self.config.hit_tolerance))
            .cloned()
    }

    // --- Gestures ---

    /// Route a pointer event. Returns the gesture outcome when a primary
    /// button release resolved an armed gesture.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Option<GestureOutcome> {
        self.input.handle_pointer_event(event);
        let primary = self.input.primary_button();

        match event {
            PointerEvent::Down { position, button } if button == primary => {
                if let Some(target) = self.connector_at(position) {
                    target.pointer_down();
                }
                None
            }
            PointerEvent::Up { position, button } if button == primary => {
                if !self.coordinator.is_armed() {
                    return None;
                }
                let target = self.connector_at(position);
                let outcome = self.coordinator.release(target.as_ref());
                log::debug!(
                    "Pointer release at ({}, {}): {:?}",
                    position.x,
                    position.y,
                    outcome
                );
                Some(outcome)
            }
            _ => None,
        }
    }

    /// The wire preview of an armed gesture.
    pub fn pending_wire(&self) -> Option<PendingWire> {
        let active = self.coordinator.active()?;
        Some(PendingWire {
            connector: active.id(),
            dragging: self.input.is_dragging,
            from: active.handle().position,
            to: self.input.pointer_position,
        })
    }

    // --- Graph ---

    pub fn edges(&self) -> Vec<Edge> {
        graph::edges(&self.connectors)
    }

    /// Connectors a value set on `id` reaches.
    pub fn downstream(&self, id: ConnectorId) -> WiringResult<Vec<Connector>> {
        let origin = self
            .connector(id)
            .ok_or_else(|| WiringError::UnknownConnector(id.to_string()))?;
        Ok(graph::downstream(&origin))
    }

    // --- Declarative wiring ---

    /// Attach one connector per spec and wire their `connect` lists.
    ///
    /// Every endpoint path, name and peer is resolved before the surface is
    /// touched, so a failing batch attaches nothing. Peers may refer to
    /// connectors later in the same batch or already on the surface, and
    /// must match exactly one connector by name. Explicit names must be
    /// unique; names derived from endpoints may repeat.
    pub fn apply(
        &mut self,
        specs: &[ConnectorSpec],
        resolver: &dyn EndpointResolver,
    ) -> WiringResult<Vec<Connector>> {
        let plan = self.plan(specs, resolver)?;

        let mut created = Vec::with_capacity(plan.len());
        for planned in &plan {
            let connector = self.create_connector(planned.spec.position.unwrap_or(Point::ZERO));
            if let Some(name) = &planned.spec.name {
                connector.set_name(name.clone());
            }
            // Destination first so binding the source pulls its value through.
            connector.set_destination_endpoint(planned.destination.clone());
            connector.set_source_endpoint(planned.source.clone());
            created.push(connector);
        }

        for (planned, connector) in plan.iter().zip(&created) {
            for peer_name in planned.spec.peer_names() {
                let peer = plan
                    .iter()
                    .zip(&created)
                    .find(|(p, _)| p.name.as_deref() == Some(peer_name))
                    .map(|(_, c)| c.clone())
                    .or_else(|| self.connector_by_name(peer_name))
                    .ok_or_else(|| WiringError::UnresolvedPeer {
                        connector: connector.label(),
                        peer: peer_name.to_string(),
                    })?;
                connector.connect(&peer);
            }
        }

        Ok(created)
    }

    fn plan<'a>(
        &self,
        specs: &'a [ConnectorSpec],
        resolver: &dyn EndpointResolver,
    ) -> WiringResult<Vec<PlannedConnector<'a>>> {
        let mut plan = Vec::with_capacity(specs.len());
        for spec in specs {
            let source = match &spec.source {
                Some(path) => Some(
                    resolver
                        .resolve(path)
                        .ok_or_else(|| WiringError::UnresolvedSource(path.clone()))?,
                ),
                None => None,
            };
            let destination = match &spec.destination {
                Some(path) => Some(
                    resolver
                        .resolve(path)
                        .ok_or_else(|| WiringError::UnresolvedDestination(path.clone()))?,
                ),
                None => None,
            };
            let name = spec
                .name
                .clone()
                .filter(|name| !name.is_empty())
                .or_else(|| source.as_ref().and_then(endpoint_name))
                .or_else(|| destination.as_ref().and_then(endpoint_name));
            plan.push(PlannedConnector {
                spec,
                name,
                source,
                destination,
            });
        }

        // Explicit names are unique. Derived names may repeat, as with the
        // in and out connectors of one widget.
        let mut explicit: HashSet<String> = self
            .connectors
            .iter()
            .filter_map(Connector::explicit_name)
            .collect();
        for planned in &plan {
            match planned.spec.name.as_deref() {
                Some(name) if !name.is_empty() => {
                    if !explicit.insert(name.to_string()) {
                        return Err(WiringError::DuplicateName(name.to_string()));
                    }
                }
                _ => {}
            }
        }

        let mut named: HashMap<String, usize> = HashMap::new();
        let resolved = self
            .connectors
            .iter()
            .filter_map(|c| c.name().ok())
            .chain(plan.iter().filter_map(|planned| planned.name.clone()));
        for name in resolved {
            *named.entry(name).or_default() += 1;
        }

        // A peer reference must pick out exactly one connector.
        for planned in &plan {
            for peer in planned.spec.peer_names() {
                match named.get(peer) {
                    Some(1) => {}
                    Some(_) => return Err(WiringError::DuplicateName(peer.to_string())),
                    None => {
                        return Err(WiringError::UnresolvedPeer {
                            connector: planned
                                .name
                                .clone()
                                .unwrap_or_else(|| "<unnamed>".to_string()),
                            peer: peer.to_string(),
                        });
                    }
                }
            }
        }

        Ok(plan)
    }
}
